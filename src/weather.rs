//! ==============================================================================
//! weather.rs - inbound weather update contracts
//! ==============================================================================
//!
//! purpose:
//!     a hub pushes one flat key/value payload per sensor reading, every value
//!     encoded as text. this module classifies the payload by its `mt` field
//!     into one variant per sensor family and keeps the raw text around.
//!     numbers are NOT parsed here; see `parse_decimal` / `parse_integer`.
//!
//! example payload (query string as sent by a hub):
//!     dateutc=now&action=updateraw&realtime=1&id=AEB123512&mt=5N1x31
//!     &sensor=00001234&battery=normal&baromin=30.17&rssi=3
//!     &windspeedmph=5&winddir=180&rainin=0.00&dailyrainin=0.00
//!
//! relationships:
//!     - uses: types.rs (classifying `mt`)
//!     - used by: report.rs, sensor.rs, registry.rs, main.rs (ingest route)
//!
//! ==============================================================================

use crate::types::{SensorGeneralType, SensorSpecificType};

use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// fields every hub payload carries, regardless of sensor family
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommonFields {
    /// always "now" in practice
    pub dateutc: String,
    /// always "updateraw" in practice
    pub action: String,
    pub realtime: String,
    /// hub id, ex: AEB123512
    pub id: String,
    /// specific sensor type, ex: 5N1x31
    pub mt: String,
    /// sensor id, ex: 00001234
    pub sensor: String,
    /// "normal" or "low"
    pub battery: String,
    /// barometric pressure, ex: 30.17
    pub baromin: String,
    /// signal strength at the hub, 1-4
    pub rssi: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TowerUpdate {
    #[serde(flatten)]
    pub common: CommonFields,
    pub tempf: String,
    pub humidity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProInUpdate {
    #[serde(flatten)]
    pub common: CommonFields,
    pub indoortempf: String,
    pub indoorhumidity: String,
    pub probe: String,
    pub check: String,
    /// "1" when the probe detects water
    pub water: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FiveInOne38Update {
    #[serde(flatten)]
    pub common: CommonFields,
    pub tempf: String,
    pub humidity: String,
    pub windspeedmph: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FiveInOne31Update {
    #[serde(flatten)]
    pub common: CommonFields,
    pub windspeedmph: String,
    /// degrees, 0-360
    pub winddir: String,
    pub rainin: String,
    pub dailyrainin: String,
}

/// a five-in-one sensor alternates between two message types
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FiveInOneUpdate {
    X38(FiveInOne38Update),
    X31(FiveInOne31Update),
}

/// one raw reading event, classified by sensor family
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WeatherUpdate {
    Tower(TowerUpdate),
    ProIn(ProInUpdate),
    FiveInOne(FiveInOneUpdate),
    /// unknown or unrecognized `mt`
    Generic(CommonFields),
}

impl FiveInOneUpdate {
    pub fn common(&self) -> &CommonFields {
        match self {
            FiveInOneUpdate::X38(u) => &u.common,
            FiveInOneUpdate::X31(u) => &u.common,
        }
    }
}

impl WeatherUpdate {
    /// classify a flat key/value payload. missing keys read as empty text.
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        let text = |key: &str| fields.get(key).cloned().unwrap_or_default();

        let common = CommonFields {
            dateutc: text("dateutc"),
            action: text("action"),
            realtime: text("realtime"),
            id: text("id"),
            mt: text("mt"),
            sensor: text("sensor"),
            battery: text("battery"),
            baromin: text("baromin"),
            rssi: text("rssi"),
        };

        let specific = SensorSpecificType::from_text_lossy(&common.mt);
        match specific.general() {
            SensorGeneralType::Tower => WeatherUpdate::Tower(TowerUpdate {
                common,
                tempf: text("tempf"),
                humidity: text("humidity"),
            }),
            SensorGeneralType::ProIn => WeatherUpdate::ProIn(ProInUpdate {
                common,
                indoortempf: text("indoortempf"),
                indoorhumidity: text("indoorhumidity"),
                probe: text("probe"),
                check: text("check"),
                water: text("water"),
            }),
            SensorGeneralType::FiveInOne if specific == SensorSpecificType::FiveInOne31 => {
                WeatherUpdate::FiveInOne(FiveInOneUpdate::X31(FiveInOne31Update {
                    common,
                    windspeedmph: text("windspeedmph"),
                    winddir: text("winddir"),
                    rainin: text("rainin"),
                    dailyrainin: text("dailyrainin"),
                }))
            }
            SensorGeneralType::FiveInOne => {
                WeatherUpdate::FiveInOne(FiveInOneUpdate::X38(FiveInOne38Update {
                    common,
                    tempf: text("tempf"),
                    humidity: text("humidity"),
                    windspeedmph: text("windspeedmph"),
                }))
            }
            SensorGeneralType::Unknown => WeatherUpdate::Generic(common),
        }
    }

    pub fn common(&self) -> &CommonFields {
        match self {
            WeatherUpdate::Tower(u) => &u.common,
            WeatherUpdate::ProIn(u) => &u.common,
            WeatherUpdate::FiveInOne(u) => u.common(),
            WeatherUpdate::Generic(common) => common,
        }
    }

    pub fn specific_type(&self) -> SensorSpecificType {
        SensorSpecificType::from_text_lossy(&self.common().mt)
    }

    pub fn general_type(&self) -> SensorGeneralType {
        self.specific_type().general()
    }
}

impl<'de> Deserialize<'de> for WeatherUpdate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = HashMap::<String, String>::deserialize(deserializer)?;
        Ok(WeatherUpdate::from_fields(&fields))
    }
}

/// parse decimal text (pressure, temperature, humidity, rain).
///
/// reads the leading number and ignores trailing text, so "54%" reads as 54.
/// text with no leading number is not rejected: it yields NaN, which
/// serializes as null.
pub fn parse_decimal(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let prefix = &trimmed[..decimal_prefix_len(trimmed)];
    prefix.parse::<f64>().unwrap_or_else(|_| {
        debug!("malformed decimal {:?}", text);
        f64::NAN
    })
}

/// byte length of the leading `[sign] digits [. digits] [e [sign] digits]`
fn decimal_prefix_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(text.starts_with(['-', '+']));
    let int_digits = digits_from(end);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits_from(end + 1);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'-' | b'+')) {
            exp += 1;
        }
        let exp_digits = digits_from(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }
    end
}

/// parse integer text (wind speed, wind direction, signal strength).
///
/// reads an optional sign and the leading digits, so "5.7" reads as 5.
/// text with no leading digits yields None.
pub fn parse_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['-', '+']));
    let digits_len = trimmed[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();

    let parsed = if digits_len == 0 {
        None
    } else {
        trimmed[..sign_len + digits_len].parse::<i64>().ok()
    };
    if parsed.is_none() {
        debug!("malformed integer {:?}", text);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_classifies_by_type_tag() {
        let tower = WeatherUpdate::from_fields(&fields(&[("mt", "tower"), ("tempf", "40.2")]));
        assert!(matches!(&tower, WeatherUpdate::Tower(u) if u.tempf == "40.2"));

        let pro = WeatherUpdate::from_fields(&fields(&[("mt", "ProIn"), ("water", "1")]));
        assert!(matches!(&pro, WeatherUpdate::ProIn(u) if u.water == "1"));

        let x31 = WeatherUpdate::from_fields(&fields(&[("mt", "5N1x31"), ("winddir", "180")]));
        assert!(matches!(
            &x31,
            WeatherUpdate::FiveInOne(FiveInOneUpdate::X31(u)) if u.winddir == "180"
        ));

        let x38 = WeatherUpdate::from_fields(&fields(&[("mt", "5N1x38"), ("humidity", "54")]));
        assert!(matches!(
            &x38,
            WeatherUpdate::FiveInOne(FiveInOneUpdate::X38(u)) if u.humidity == "54"
        ));

        let other = WeatherUpdate::from_fields(&fields(&[("mt", "lightning"), ("id", "HUB")]));
        assert!(matches!(&other, WeatherUpdate::Generic(c) if c.id == "HUB"));
        assert_eq!(other.general_type(), SensorGeneralType::Unknown);
    }

    #[test]
    fn test_deserializes_from_flat_json() {
        let json = r#"{"id":"AEB123512","sensor":"00001234","mt":"tower",
                       "battery":"low","tempf":"40.2","humidity":"54"}"#;
        let update: WeatherUpdate = serde_json::from_str(json).unwrap();

        assert_eq!(update.common().sensor, "00001234");
        assert_eq!(update.common().battery, "low");
        assert_eq!(update.specific_type(), SensorSpecificType::Tower);
        assert_eq!(update.common().rssi, "");
    }

    #[test]
    fn test_serializes_back_to_a_flat_map() {
        let update = WeatherUpdate::from_fields(&fields(&[("mt", "tower"), ("tempf", "40.2")]));
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value["mt"], "tower");
        assert_eq!(value["tempf"], "40.2");
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("30.17"), 30.17);
        assert_eq!(parse_decimal(" 0.00 "), 0.0);
        assert!(parse_decimal("n/a").is_nan());
        assert!(parse_decimal("").is_nan());
    }

    #[test]
    fn test_parse_decimal_reads_leading_number() {
        assert_eq!(parse_decimal("54%"), 54.0);
        assert_eq!(parse_decimal("-3.5F"), -3.5);
        assert_eq!(parse_decimal(".25in"), 0.25);
        assert_eq!(parse_decimal("7."), 7.0);
        assert_eq!(parse_decimal("1e3x"), 1000.0);
        assert_eq!(parse_decimal("2e"), 2.0);
        assert!(parse_decimal("-.").is_nan());
        assert!(parse_decimal("--").is_nan());
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("180"), Some(180));
        assert_eq!(parse_integer("5.7"), Some(5));
        assert_eq!(parse_integer("-3"), Some(-3));
        assert_eq!(parse_integer("abc"), None);
        assert_eq!(parse_integer(""), None);
    }
}
