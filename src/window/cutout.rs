//! Display cutout detection
//!
//! Newer platforms report cutout rectangles directly. Older ones only
//! expose vendor-specific hints, probed through a table keyed by
//! manufacturer. Unknown vendors have no cutout.

use std::collections::HashMap;

/// First API level that reports cutout rectangles
pub const CUTOUT_API_LEVEL: u32 = 28;

const OPPO_CUTOUT_FEATURE: &str = "com.oppo.feature.screen.heteromorphism";
const VIVO_CUTOUT_FLAG: u32 = 0x20;
const XIAOMI_NOTCH_PROPERTY: &str = "ro.miui.notch";

/// Layout behaviour around a cutout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutoutMode {
    /// Keep content out of the cutout area
    Default,
    /// Extend content into the cutout on the short edges
    ShortEdges,
}

/// What the platform knows about the device
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceInfo {
    pub manufacturer: String,
    pub api_level: u32,
    /// Bounding rectangles reported for the display cutout
    pub cutout_rects: usize,
    /// Answer of the vendor's own notch query, when it has one
    pub vendor_notch_query: Option<bool>,
    pub system_features: Vec<String>,
    pub system_properties: HashMap<String, String>,
    /// Vendor feature bitmask
    pub feature_flags: u32,
}

type CutoutProbe = fn(&DeviceInfo) -> bool;

const VENDOR_PROBES: &[(&str, CutoutProbe)] = &[
    ("huawei", huawei),
    ("oppo", oppo),
    ("vivo", vivo),
    ("xiaomi", xiaomi),
];

fn huawei(info: &DeviceInfo) -> bool {
    info.vendor_notch_query.unwrap_or(false)
}

fn oppo(info: &DeviceInfo) -> bool {
    info.system_features.iter().any(|f| f == OPPO_CUTOUT_FEATURE)
}

fn vivo(info: &DeviceInfo) -> bool {
    info.feature_flags & VIVO_CUTOUT_FLAG != 0
}

fn xiaomi(info: &DeviceInfo) -> bool {
    info.system_properties
        .get(XIAOMI_NOTCH_PROPERTY)
        .map(|v| v.trim() == "1")
        .unwrap_or(false)
}

/// Whether the display has a cutout the layout must avoid
pub fn has_cutout(info: &DeviceInfo) -> bool {
    if info.api_level >= CUTOUT_API_LEVEL {
        return info.cutout_rects > 0;
    }

    VENDOR_PROBES
        .iter()
        .find(|(vendor, _)| info.manufacturer.eq_ignore_ascii_case(vendor))
        .map(|(_, probe)| probe(info))
        .unwrap_or(false)
}

/// Cutout mode to request for the adapt flag
pub fn cutout_mode(adapt: bool) -> CutoutMode {
    if adapt {
        CutoutMode::ShortEdges
    } else {
        CutoutMode::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy(manufacturer: &str) -> DeviceInfo {
        DeviceInfo {
            manufacturer: manufacturer.to_string(),
            api_level: 26,
            ..Default::default()
        }
    }

    #[test]
    fn test_modern_devices_use_reported_rects() {
        let mut info = DeviceInfo {
            manufacturer: "xiaomi".to_string(),
            api_level: 30,
            ..Default::default()
        };
        info.system_properties.insert(XIAOMI_NOTCH_PROPERTY.to_string(), "1".to_string());
        assert!(!has_cutout(&info));

        info.cutout_rects = 1;
        assert!(has_cutout(&info));
    }

    #[test]
    fn test_vendor_probes() {
        let mut huawei = legacy("HUAWEI");
        huawei.vendor_notch_query = Some(true);
        assert!(has_cutout(&huawei));

        let mut oppo = legacy("OPPO");
        oppo.system_features.push(OPPO_CUTOUT_FEATURE.to_string());
        assert!(has_cutout(&oppo));

        let mut vivo = legacy("vivo");
        vivo.feature_flags = 0x20;
        assert!(has_cutout(&vivo));

        let mut xiaomi = legacy("Xiaomi");
        xiaomi.system_properties.insert(XIAOMI_NOTCH_PROPERTY.to_string(), "0".to_string());
        assert!(!has_cutout(&xiaomi));
    }

    #[test]
    fn test_unknown_vendor_has_no_cutout() {
        let mut info = legacy("acme");
        info.vendor_notch_query = Some(true);
        info.feature_flags = 0xff;
        assert!(!has_cutout(&info));
    }
}
