//! Unit name escaping and the unit names derived from DRBD resources

/// Escape an arbitrary string for use inside a unit name.
///
/// Follows `systemd-escape`: `[A-Za-z0-9:_]` pass through, `.` passes unless
/// it is the first byte, `/` becomes `-`, everything else is `\xHH`.
pub fn escape_name(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for (index, b) in name.bytes().enumerate() {
        match b {
            b'/' => escaped.push('-'),
            b':' | b'_' | b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' => escaped.push(char::from(b)),
            b'.' if index > 0 => escaped.push('.'),
            _ => escaped.push_str(&format!("\\x{:02x}", b)),
        }
    }
    escaped
}

/// `drbd-services@<resource>.target`, the target grouping a promoter's services
pub fn services_target(resource: &str) -> String {
    format!("drbd-services@{}.target", escape_name(resource))
}

/// `drbd-promote@<resource>.service`, the implicit first unit of every target
pub fn promote_service(resource: &str) -> String {
    format!("drbd-promote@{}.service", escape_name(resource))
}

/// Instance unit wrapping an OCF resource agent for `resource`
pub fn ocf_service(instance: &str, resource: &str) -> String {
    format!(
        "ocf.ra@{}.service",
        escape_name(&format!("{}_{}", instance, resource))
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_pass_through() {
        assert_eq!(escape_name("r0"), "r0");
        assert_eq!(escape_name("my_res:1"), "my_res:1");
        assert_eq!(escape_name(""), "");
    }

    #[test]
    fn test_special_bytes_are_escaped() {
        assert_eq!(escape_name("a-b"), "a\\x2db");
        assert_eq!(escape_name("a b"), "a\\x20b");
        assert_eq!(escape_name("a/b"), "a-b");
        assert_eq!(escape_name("ä"), "\\xc3\\xa4");
    }

    #[test]
    fn test_leading_dot_is_escaped() {
        assert_eq!(escape_name(".hidden"), "\\x2ehidden");
        assert_eq!(escape_name("a.b"), "a.b");
    }

    #[test]
    fn test_escape_is_deterministic() {
        let name = "web-data/01";
        assert_eq!(escape_name(name), escape_name(name));
        assert_eq!(services_target(name), services_target(name));
    }

    #[test]
    fn test_derived_unit_names() {
        assert_eq!(services_target("r0"), "drbd-services@r0.target");
        assert_eq!(services_target("r-0"), "drbd-services@r\\x2d0.target");
        assert_eq!(promote_service("r0"), "drbd-promote@r0.service");
        assert_eq!(ocf_service("vip", "r0"), "ocf.ra@vip_r0.service");
    }
}
