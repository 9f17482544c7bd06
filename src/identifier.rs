//! Compound resource names.
//!
//! A resource is usually named `<fmri>#<property>`, e.g.
//! `network/dhcp/server:ipv4#config/listen_ifnames`. The FMRI itself is
//! passed through untouched, so `svc:/...` and `svc://...` forms work too.

/// The two halves of a compound resource name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// Everything before the first `#`, or the whole name.
    pub service_id: String,
    /// Everything after the first `#`, if there was one.
    pub property_name: Option<String>,
}

/// Split a compound name on its first `#`.
///
/// ```
/// use smf_property::identifier::parse_name;
///
/// let parsed = parse_name("network/dhcp/server:ipv4#config/listen_ifnames");
/// assert_eq!(parsed.service_id, "network/dhcp/server:ipv4");
/// assert_eq!(parsed.property_name.as_deref(), Some("config/listen_ifnames"));
///
/// assert_eq!(parse_name("network/dns/client").property_name, None);
/// ```
pub fn parse_name(name: &str) -> ParsedName {
    match name.split_once('#') {
        Some((service_id, property_name)) => ParsedName {
            service_id: service_id.to_string(),
            property_name: Some(property_name.to_string()),
        },
        None => ParsedName {
            service_id: name.to_string(),
            property_name: None,
        },
    }
}
