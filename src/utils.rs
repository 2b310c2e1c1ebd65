use std::borrow::Cow;

/// Server replies often span lines, keeps log and console output to one line per event
pub fn make_single_line(s: &str) -> Cow<'_, str> {
    if s.contains('\n') {
        Cow::Owned(s.replace("\r\n", "↵").replace('\n', "↵"))
    } else {
        Cow::Borrowed(s)
    }
}
