// common.rs -- console printing shared by client and tools
//
// com_printf is the console text path: it writes to stdout unless a
// redirect is active, in which case the text is captured so the caller can
// hand it elsewhere (rcon replies, the presentation layer, tests).
// Developer chatter goes through tracing instead.

use parking_lot::Mutex;

pub const MAXPRINTMSG: usize = 4096;

// ============================================================
// Redirect buffer for Com_Printf
// ============================================================

static RD_BUFFER: Mutex<Option<String>> = Mutex::new(None);

/// Serializes com_capture callers so concurrent captures don't interleave.
static CAPTURE_LOCK: Mutex<()> = Mutex::new(());

/// Begin redirecting printf output into a buffer.
pub fn com_begin_redirect() {
    let mut buf = RD_BUFFER.lock();
    *buf = Some(String::new());
}

/// End redirect and return the captured output.
pub fn com_end_redirect() -> Option<String> {
    let mut buf = RD_BUFFER.lock();
    buf.take()
}

/// Run `f` with printf output captured, returning what it printed.
pub fn com_capture<F: FnOnce()>(f: F) -> String {
    let _guard = CAPTURE_LOCK.lock();
    com_begin_redirect();
    f();
    com_end_redirect().unwrap_or_default()
}

// ============================================================
// Com_Printf / Com_DPrintf
// ============================================================

/// General-purpose print function. Prints to stdout and appends to redirect
/// buffer if one is active.
pub fn com_printf(msg: &str) {
    {
        let mut buf = RD_BUFFER.lock();
        if let Some(ref mut s) = *buf {
            if s.len() + msg.len() <= MAXPRINTMSG * 16 {
                s.push_str(msg);
            }
            return;
        }
    }
    print!("{}", msg);
}

/// Developer-only print.
pub fn com_dprintf(msg: &str) {
    tracing::debug!(target: "console", "{}", msg.trim_end());
}
