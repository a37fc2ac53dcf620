//! Process-environment lookup, used as the fallback source for a `$name`
//! reference that no in-document variable defines (spec 4.6).

pub(crate) fn lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
