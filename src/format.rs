use ryu::Buffer;
use std::cell::RefCell;

/// Render a score the short way: `1.0` prints as `1`, `0.7` as `0.7`.
/// Non-finite scores fall back to ryu's `inf`/`NaN` spellings.
#[inline]
pub fn fmt_f64(buf: &mut Buffer, score: f64) -> &str {
    let formatted = buf.format(score);
    formatted.strip_suffix(".0").unwrap_or(formatted)
}

thread_local! {
    static FMT_BUF: RefCell<Buffer> = RefCell::new(Buffer::new());
}

#[inline]
pub fn with_fmt_buf<F, R>(f: F) -> R
where
    F: FnOnce(&mut Buffer) -> R,
{
    FMT_BUF.with(|b| f(&mut b.borrow_mut()))
}
