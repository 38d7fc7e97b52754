use crate::error::Result;
use minijinja::{Environment, context};

const BASE: &str = include_str!("../../templates/base.html");
const INDEX: &str = include_str!("../../templates/index.html");
const CHAT: &str = include_str!("../../templates/chat.html");
const REPORT: &str = include_str!("../../templates/report.html");

/// HTML page templates
pub struct Pages {
    env: Environment<'static>,
}

impl Pages {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("base.html", BASE)?;
        env.add_template("index.html", INDEX)?;
        env.add_template("chat.html", CHAT)?;
        env.add_template("report.html", REPORT)?;
        Ok(Self { env })
    }

    pub fn index(&self) -> Result<String> {
        self.render("index.html", "Investment Assistant")
    }

    pub fn chat(&self) -> Result<String> {
        self.render("chat.html", "Finance & Web Assistant")
    }

    pub fn report(&self) -> Result<String> {
        self.render("report.html", "Investment Report")
    }

    fn render(&self, name: &str, title: &str) -> Result<String> {
        let template = self.env.get_template(name)?;
        Ok(template.render(context! {
            title => title,
            version => env!("CARGO_PKG_VERSION"),
        })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_render() {
        let pages = Pages::new().unwrap();
        let index = pages.index().unwrap();
        assert!(index.contains("TCS.NS"));
        assert!(index.contains("<title>Investment Assistant</title>"));
        assert!(pages.chat().unwrap().contains("/api/sessions"));
        assert!(pages.report().unwrap().contains("/api/report"));
    }

    #[test]
    fn test_chat_page_ends_session_on_leave() {
        let chat = Pages::new().unwrap().chat().unwrap();
        assert!(chat.contains(r#"addEventListener("pagehide""#));
        assert!(chat.contains(r#"method: "DELETE", keepalive: true"#));
    }
}
