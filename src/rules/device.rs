//! Device-based rule evaluation: different links per device class.

use crate::LinkId;
use crate::VisitorContext;
use crate::config::DeviceConfig;

/// A visitor with no known device type is treated as desktop. An unmapped
/// device key yields no match.
pub(crate) fn evaluate(config: &DeviceConfig, visitor: &VisitorContext) -> Vec<LinkId> {
    let device = visitor.device_or_default();
    config.device_mappings.get(device.as_str()).cloned().unwrap_or_default()
}
