use serde::{Deserialize, Serialize};

use super::calendar::UNAVAILABLE;

/// Upstream key and display label for every daily time, in display order.
pub const ZMANIM_FIELDS: [(&str, &str); 22] = [
    ("chatzotNight", "Midnight - Chatzot"),
    ("alotHaShachar", "Dawn - Alot haShachar"),
    ("misheyakir", "Earliest tallit & tefillin - Misheyakir"),
    ("misheyakirMachmir", "Earliest tallit & tefillin - Misheyakir Machmir"),
    ("dawn", "Civil dawn"),
    ("sunrise", "Sunrise"),
    ("sofZmanShma", "Latest Shema (Gra)"),
    ("sofZmanShmaMGA", "Latest Shema (MGA)"),
    ("sofZmanTfilla", "Latest Shacharit (Gra)"),
    ("sofZmanTfillaMGA", "Latest Shacharit (MGA)"),
    ("chatzot", "Midday - Chatzot"),
    ("minchaGedola", "Earliest Mincha - Mincha Gedola"),
    ("minchaKetana", "Mincha Ketana"),
    ("plagHaMincha", "Plag haMincha"),
    ("sunset", "Sunset"),
    ("dusk", "Civil dusk"),
    ("beinHaShmashos", "Bein HaShmashot"),
    ("tzeit7083deg", "Nightfall - Tzeit 7.083°"),
    ("tzeit85deg", "Nightfall - Tzeit 8.5°"),
    ("tzeit42min", "Nightfall - Tzeit 42 minutes"),
    ("tzeit50min", "Nightfall - Tzeit 50 minutes"),
    ("tzeit72min", "Nightfall - Rabbeinu Tam (72 minutes)"),
];

/// Location metadata echoed by the `/zmanim` endpoint. Every field is
/// optional because zip and geoname lookups return different subsets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub il: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tzid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geonameid: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asciiname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<i64>,
}

/// The formatted daily times. Each value is a local `H:MM AM/PM` string or
/// [`UNAVAILABLE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTimes {
    #[serde(rename = "chatzotNight")]
    pub chatzot_night: String,
    #[serde(rename = "alotHaShachar")]
    pub alot_ha_shachar: String,
    #[serde(rename = "misheyakir")]
    pub misheyakir: String,
    #[serde(rename = "misheyakirMachmir")]
    pub misheyakir_machmir: String,
    #[serde(rename = "dawn")]
    pub dawn: String,
    #[serde(rename = "sunrise")]
    pub sunrise: String,
    #[serde(rename = "sofZmanShma")]
    pub sof_zman_shma: String,
    #[serde(rename = "sofZmanShmaMGA")]
    pub sof_zman_shma_mga: String,
    #[serde(rename = "sofZmanTfilla")]
    pub sof_zman_tfilla: String,
    #[serde(rename = "sofZmanTfillaMGA")]
    pub sof_zman_tfilla_mga: String,
    #[serde(rename = "chatzot")]
    pub chatzot: String,
    #[serde(rename = "minchaGedola")]
    pub mincha_gedola: String,
    #[serde(rename = "minchaKetana")]
    pub mincha_ketana: String,
    #[serde(rename = "plagHaMincha")]
    pub plag_ha_mincha: String,
    #[serde(rename = "sunset")]
    pub sunset: String,
    #[serde(rename = "dusk")]
    pub dusk: String,
    #[serde(rename = "beinHaShmashos")]
    pub bein_ha_shmashos: String,
    #[serde(rename = "tzeit7083deg")]
    pub tzeit_7083deg: String,
    #[serde(rename = "tzeit85deg")]
    pub tzeit_85deg: String,
    #[serde(rename = "tzeit42min")]
    pub tzeit_42min: String,
    #[serde(rename = "tzeit50min")]
    pub tzeit_50min: String,
    #[serde(rename = "tzeit72min")]
    pub tzeit_72min: String,
}

impl DailyTimes {
    /// Build every field by calling `value_for` with its upstream key.
    /// Each call is independent, so one bad value cannot affect the rest.
    pub fn from_fn(mut value_for: impl FnMut(&str) -> String) -> Self {
        Self {
            chatzot_night: value_for("chatzotNight"),
            alot_ha_shachar: value_for("alotHaShachar"),
            misheyakir: value_for("misheyakir"),
            misheyakir_machmir: value_for("misheyakirMachmir"),
            dawn: value_for("dawn"),
            sunrise: value_for("sunrise"),
            sof_zman_shma: value_for("sofZmanShma"),
            sof_zman_shma_mga: value_for("sofZmanShmaMGA"),
            sof_zman_tfilla: value_for("sofZmanTfilla"),
            sof_zman_tfilla_mga: value_for("sofZmanTfillaMGA"),
            chatzot: value_for("chatzot"),
            mincha_gedola: value_for("minchaGedola"),
            mincha_ketana: value_for("minchaKetana"),
            plag_ha_mincha: value_for("plagHaMincha"),
            sunset: value_for("sunset"),
            dusk: value_for("dusk"),
            bein_ha_shmashos: value_for("beinHaShmashos"),
            tzeit_7083deg: value_for("tzeit7083deg"),
            tzeit_85deg: value_for("tzeit85deg"),
            tzeit_42min: value_for("tzeit42min"),
            tzeit_50min: value_for("tzeit50min"),
            tzeit_72min: value_for("tzeit72min"),
        }
    }

    pub fn unavailable() -> Self {
        Self::from_fn(|_| UNAVAILABLE.to_string())
    }

    /// Look up a value by its upstream key.
    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "chatzotNight" => &self.chatzot_night,
            "alotHaShachar" => &self.alot_ha_shachar,
            "misheyakir" => &self.misheyakir,
            "misheyakirMachmir" => &self.misheyakir_machmir,
            "dawn" => &self.dawn,
            "sunrise" => &self.sunrise,
            "sofZmanShma" => &self.sof_zman_shma,
            "sofZmanShmaMGA" => &self.sof_zman_shma_mga,
            "sofZmanTfilla" => &self.sof_zman_tfilla,
            "sofZmanTfillaMGA" => &self.sof_zman_tfilla_mga,
            "chatzot" => &self.chatzot,
            "minchaGedola" => &self.mincha_gedola,
            "minchaKetana" => &self.mincha_ketana,
            "plagHaMincha" => &self.plag_ha_mincha,
            "sunset" => &self.sunset,
            "dusk" => &self.dusk,
            "beinHaShmashos" => &self.bein_ha_shmashos,
            "tzeit7083deg" => &self.tzeit_7083deg,
            "tzeit85deg" => &self.tzeit_85deg,
            "tzeit42min" => &self.tzeit_42min,
            "tzeit50min" => &self.tzeit_50min,
            "tzeit72min" => &self.tzeit_72min,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// (label, value) pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        ZMANIM_FIELDS
            .iter()
            .filter_map(|(key, label)| self.get(key).map(|v| (*label, v)))
            .collect()
    }

    pub fn available_count(&self) -> usize {
        self.entries().iter().filter(|(_, v)| *v != UNAVAILABLE).count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTimesSnapshot {
    pub date: String,
    pub location: DailyLocation,
    pub times: DailyTimes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_field_key_is_addressable() {
        let times = DailyTimes::from_fn(|key| format!("v:{}", key));
        for (key, _) in ZMANIM_FIELDS {
            assert_eq!(times.get(key), Some(format!("v:{}", key).as_str()));
        }
        assert_eq!(times.entries().len(), ZMANIM_FIELDS.len());
        assert_eq!(times.get("nonsense"), None);
    }

    #[test]
    fn test_serialized_keys_match_upstream() {
        let times = DailyTimes::unavailable();
        let value = serde_json::to_value(&times).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), ZMANIM_FIELDS.len());
        for (key, _) in ZMANIM_FIELDS {
            assert_eq!(object[key], UNAVAILABLE);
        }
        assert_eq!(times.available_count(), 0);
    }
}
