//! Opening screen.

use std::env;

use tracing::debug;

const ASCII_BANNER: &str = include_str!("../assets/opening-ascii.txt");
const UTF8_BANNER: &str = include_str!("../assets/opening-utf8.txt");

/// Pick the banner a terminal can render: plain ASCII under the C locale
/// or on `vt*` terminals, box drawing otherwise.
pub fn banner_for(locale: Option<&str>, term: Option<&str>) -> &'static str {
    let ascii_only = locale == Some("C") || term.is_some_and(|t| t.starts_with("vt"));
    if ascii_only { ASCII_BANNER } else { UTF8_BANNER }
}

/// Clear the console and print the banner.
pub fn show() {
    let term = console::Term::stdout();
    if let Err(e) = term.clear_screen() {
        debug!(error = %e, "console clear failed");
    }

    let locale = env::var("LC_ALL").ok();
    let term_name = env::var("TERM").ok();
    println!("{}", banner_for(locale.as_deref(), term_name.as_deref()));
}
