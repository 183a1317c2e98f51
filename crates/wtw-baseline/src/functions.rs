use rusqlite::Connection;
use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::ValueRef;
use wtw_core::linemask;

/// Registers the linemask predicates the resolution query joins on:
///
/// - `any_intersection(mask_a, mask_b)`: some line is set in both masks
/// - `linemask_contains(mask, lineno)`: `lineno` is set in `mask`
///
/// Non-blob masks and non-integer line numbers never match.
pub(crate) fn register(conn: &Connection) -> rusqlite::Result<()> {
    let flags = FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC;

    conn.create_scalar_function("any_intersection", 2, flags, |ctx| {
        Ok(linemask::intersects(blob_arg(ctx, 0), blob_arg(ctx, 1)))
    })?;

    conn.create_scalar_function("linemask_contains", 2, flags, |ctx| {
        Ok(match ctx.get_raw(1) {
            ValueRef::Integer(line) => linemask::contains(blob_arg(ctx, 0), line),
            _ => false,
        })
    })?;

    Ok(())
}

fn blob_arg<'a>(ctx: &'a Context<'_>, index: usize) -> &'a [u8] {
    match ctx.get_raw(index) {
        ValueRef::Blob(bytes) => bytes,
        _ => &[],
    }
}
