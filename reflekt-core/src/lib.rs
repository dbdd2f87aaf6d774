use colored::Colorize;

pub mod crawl;
pub mod probe;
pub mod report;

const BANNER: &str = r#"
           __ _      _    _
  _ _ ___ / _| |___ | |__| |_
 | '_/ -_)  _| / -_)| / /|  _|
 |_| \___|_| |_\___||_\_\ \__|
"#;

pub fn print_banner() {
    println!("{}", BANNER.bright_magenta().bold());
    println!(
        "  {} {}\n",
        "hidden parameter discovery and reflection probing".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
