//! Per-request visitor facts.
//!
//! A [`VisitorContext`] is built once per inbound public page view and never
//! persisted by the engine (recording it is the analytics collaborator's
//! job). The caller usually derives the device type from the raw user-agent
//! header via [`detect_device_type`].

use serde::{Deserialize, Serialize};

/// Coarse device class a visitor is browsing from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Tablet,
    #[default]
    Desktop,
}

impl DeviceType {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceType::Mobile => "mobile",
            DeviceType::Tablet => "tablet",
            DeviceType::Desktop => "desktop",
        }
    }
}

/// The derived, per-request facts about who is viewing a hub.
///
/// `country` is an ISO country code resolved externally (geo-IP); it stays
/// unset when resolution failed or was skipped. `user_agent` and `referrer`
/// are informational only — the engine never evaluates them directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorContext {
    pub ip: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub device: Option<DeviceType>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub referrer: Option<String>,
}

impl VisitorContext {
    pub fn new(ip: impl Into<String>) -> Self {
        Self { ip: ip.into(), ..Self::default() }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_device(mut self, device: DeviceType) -> Self {
        self.device = Some(device);
        self
    }

    /// Record the raw user-agent header. When no device type was set
    /// explicitly, one is derived from the header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        let user_agent = user_agent.into();
        if self.device.is_none() {
            self.device = Some(detect_device_type(&user_agent));
        }
        self.user_agent = Some(user_agent);
        self
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }

    /// The device class used for rule evaluation; desktop when unknown.
    pub(crate) fn device_or_default(&self) -> DeviceType {
        self.device.unwrap_or_default()
    }
}

/// Classify a raw user-agent string as mobile, tablet or desktop.
///
/// Android distinguishes phones from tablets by the presence of "Mobile" in
/// the UA; everything unrecognized is treated as desktop.
pub fn detect_device_type(user_agent: &str) -> DeviceType {
    if regex!(r"(?i)android").is_match(user_agent) {
        if regex!(r"(?i)mobile").is_match(user_agent) {
            return DeviceType::Mobile;
        }
        return DeviceType::Tablet;
    }

    if regex!(r"(?i)ip(hone|od)").is_match(user_agent) {
        return DeviceType::Mobile;
    }

    if regex!(r"(?i)tablet|ipad").is_match(user_agent) {
        return DeviceType::Tablet;
    }

    if regex!(r"(?i)windows phone|blackberry").is_match(user_agent) {
        return DeviceType::Mobile;
    }

    DeviceType::Desktop
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_detection_examples() {
        // Array of (expected_device, user_agent)
        let cases: Vec<(DeviceType, &str)> = vec![
            (DeviceType::Mobile, "Mozilla/5.0 (Linux; Android 14; Pixel 8) Mobile Safari/537.36"),
            (DeviceType::Tablet, "Mozilla/5.0 (Linux; Android 13; SM-X710) Safari/537.36"),
            (DeviceType::Mobile, "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)"),
            (DeviceType::Mobile, "Mozilla/5.0 (iPod touch; CPU iPhone OS 15_0 like Mac OS X)"),
            (DeviceType::Tablet, "Mozilla/5.0 (iPad; CPU OS 16_0 like Mac OS X)"),
            (DeviceType::Mobile, "Mozilla/5.0 (Windows Phone 10.0; Android 6.0.1)"),
            (DeviceType::Mobile, "Mozilla/5.0 (BlackBerry; U; BlackBerry 9900)"),
            (DeviceType::Desktop, "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0"),
            (DeviceType::Desktop, "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_2) Safari/605.1.15"),
            (DeviceType::Desktop, ""),
        ];

        for (expected, ua) in cases {
            assert_eq!(detect_device_type(ua), expected, "user agent: {ua:?}");
        }
    }

    #[test]
    fn user_agent_builder_derives_device_once() {
        let visitor = VisitorContext::new("198.51.100.4")
            .with_user_agent("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)");
        assert_eq!(visitor.device, Some(DeviceType::Mobile));

        // An explicit device wins over later UA-based derivation.
        let visitor = VisitorContext::new("198.51.100.4")
            .with_device(DeviceType::Tablet)
            .with_user_agent("Mozilla/5.0 (iPhone)");
        assert_eq!(visitor.device, Some(DeviceType::Tablet));
    }

    #[test]
    fn device_defaults_to_desktop() {
        let visitor = VisitorContext::new("198.51.100.4");
        assert_eq!(visitor.device_or_default(), DeviceType::Desktop);
    }
}
