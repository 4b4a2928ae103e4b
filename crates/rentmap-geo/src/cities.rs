//! Preset city centres for quick-jump navigation, in `GCJ02`.

use serde::Serialize;

use crate::coord::{CoordSystem, Coordinate};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CityCenter {
    /// Display name, e.g. `"北京"`.
    pub name: &'static str,
    /// Lower-case pinyin, e.g. `"beijing"`.
    pub slug: &'static str,
    pub center: Coordinate,
}

const fn city(name: &'static str, slug: &'static str, lat: f64, lng: f64) -> CityCenter {
    CityCenter {
        name,
        slug,
        center: Coordinate::tagged(lng, lat, CoordSystem::Gcj02),
    }
}

pub const CITY_CENTERS: [CityCenter; 10] = [
    city("北京", "beijing", 39.9042, 116.4074),
    city("上海", "shanghai", 31.2304, 121.4737),
    city("广州", "guangzhou", 23.1291, 113.2644),
    city("深圳", "shenzhen", 22.5431, 114.0579),
    city("杭州", "hangzhou", 30.2741, 120.1551),
    city("南京", "nanjing", 32.0603, 118.7969),
    city("成都", "chengdu", 30.5728, 104.0668),
    city("武汉", "wuhan", 30.5928, 114.3055),
    city("西安", "xian", 34.3416, 108.9398),
    city("重庆", "chongqing", 29.5630, 106.5516),
];

/// Looks a city up by display name or pinyin slug (case-insensitive).
#[must_use]
pub fn city_center(query: &str) -> Option<&'static CityCenter> {
    let query = query.trim();
    CITY_CENTERS
        .iter()
        .find(|c| c.name == query || c.slug.eq_ignore_ascii_case(query))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_by_name_and_slug() {
        let by_name = city_center("上海").unwrap();
        let by_slug = city_center(" ShangHai ").unwrap();
        assert_eq!(by_name, by_slug);
        assert!((by_name.center.latitude() - 31.2304).abs() < f64::EPSILON);
        assert!((by_name.center.longitude() - 121.4737).abs() < f64::EPSILON);
    }

    #[test]
    fn centers_are_canonical_and_inside_the_zone() {
        for city in &CITY_CENTERS {
            assert_eq!(city.center.system(), CoordSystem::Gcj02);
            assert!(!crate::is_outside_obfuscation_zone(
                city.center.longitude(),
                city.center.latitude()
            ));
        }
    }

    #[test]
    fn unknown_city_is_none() {
        assert!(city_center("天津").is_none());
        assert!(city_center("").is_none());
    }
}
