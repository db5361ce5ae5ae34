use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

/// A zone the marketplace schedules classes in, with a constant UTC offset.
///
/// Offsets are standard-time constants baked into the table; there is no
/// daylight-saving adjustment anywhere in this module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneEntry {
    pub id: &'static str,
    pub label: &'static str,
    pub offset_minutes: i32,
}

impl ZoneEntry {
    pub fn offset_label(&self) -> String {
        let sign = if self.offset_minutes < 0 { '-' } else { '+' };
        let magnitude = self.offset_minutes.abs();
        let hours = magnitude / 60;
        let minutes = magnitude % 60;
        if minutes == 0 {
            format!("UTC{sign}{hours}")
        } else {
            format!("UTC{sign}{hours}:{minutes:02}")
        }
    }

    pub fn view(&self) -> ZoneView {
        ZoneView {
            id: self.id,
            label: self.label,
            offset: self.offset_label(),
            offset_minutes: self.offset_minutes,
        }
    }

    fn fixed_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.offset_minutes * 60)
    }
}

/// Serializable zone representation for API responses and CLI output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneView {
    pub id: &'static str,
    pub label: &'static str,
    pub offset: String,
    pub offset_minutes: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("unknown timezone '{id}'")]
    UnknownZone { id: String },
}

const EASTERN: ZoneEntry = ZoneEntry {
    id: "America/New_York",
    label: "Eastern Time",
    offset_minutes: -5 * 60,
};
const CENTRAL: ZoneEntry = ZoneEntry {
    id: "America/Chicago",
    label: "Central Time",
    offset_minutes: -6 * 60,
};
const MOUNTAIN: ZoneEntry = ZoneEntry {
    id: "America/Denver",
    label: "Mountain Time",
    offset_minutes: -7 * 60,
};
const PACIFIC: ZoneEntry = ZoneEntry {
    id: "America/Los_Angeles",
    label: "Pacific Time",
    offset_minutes: -8 * 60,
};

const LA_PAZ: ZoneEntry = ZoneEntry {
    id: "America/La_Paz",
    label: "Bolivia Time",
    offset_minutes: -4 * 60,
};
const LIMA: ZoneEntry = ZoneEntry {
    id: "America/Lima",
    label: "Peru Time",
    offset_minutes: -5 * 60,
};
const BOGOTA: ZoneEntry = ZoneEntry {
    id: "America/Bogota",
    label: "Colombia Time",
    offset_minutes: -5 * 60,
};
const GUAYAQUIL: ZoneEntry = ZoneEntry {
    id: "America/Guayaquil",
    label: "Ecuador Time",
    offset_minutes: -5 * 60,
};
const CARACAS: ZoneEntry = ZoneEntry {
    id: "America/Caracas",
    label: "Venezuela Time",
    offset_minutes: -4 * 60,
};
const BUENOS_AIRES: ZoneEntry = ZoneEntry {
    id: "America/Argentina/Buenos_Aires",
    label: "Argentina Time",
    offset_minutes: -3 * 60,
};
const MONTEVIDEO: ZoneEntry = ZoneEntry {
    id: "America/Montevideo",
    label: "Uruguay Time",
    offset_minutes: -3 * 60,
};
const ASUNCION: ZoneEntry = ZoneEntry {
    id: "America/Asuncion",
    label: "Paraguay Time",
    offset_minutes: -4 * 60,
};
const SANTIAGO: ZoneEntry = ZoneEntry {
    id: "America/Santiago",
    label: "Chile Continental Time",
    offset_minutes: -4 * 60,
};
const EASTER_ISLAND: ZoneEntry = ZoneEntry {
    id: "Pacific/Easter",
    label: "Easter Island Time",
    offset_minutes: -6 * 60,
};
const GUATEMALA: ZoneEntry = ZoneEntry {
    id: "America/Guatemala",
    label: "Guatemala Time",
    offset_minutes: -6 * 60,
};
const COSTA_RICA: ZoneEntry = ZoneEntry {
    id: "America/Costa_Rica",
    label: "Costa Rica Time",
    offset_minutes: -6 * 60,
};
const PANAMA: ZoneEntry = ZoneEntry {
    id: "America/Panama",
    label: "Panama Time",
    offset_minutes: -5 * 60,
};
const SANTO_DOMINGO: ZoneEntry = ZoneEntry {
    id: "America/Santo_Domingo",
    label: "Dominican Republic Time",
    offset_minutes: -4 * 60,
};
const MEXICO_CITY: ZoneEntry = ZoneEntry {
    id: "America/Mexico_City",
    label: "Mexico Central Time",
    offset_minutes: -6 * 60,
};
const MAZATLAN: ZoneEntry = ZoneEntry {
    id: "America/Mazatlan",
    label: "Mexico Pacific Time",
    offset_minutes: -7 * 60,
};
const TIJUANA: ZoneEntry = ZoneEntry {
    id: "America/Tijuana",
    label: "Mexico Northwest Time",
    offset_minutes: -8 * 60,
};
const CANCUN: ZoneEntry = ZoneEntry {
    id: "America/Cancun",
    label: "Mexico Southeast Time",
    offset_minutes: -5 * 60,
};
const SAO_PAULO: ZoneEntry = ZoneEntry {
    id: "America/Sao_Paulo",
    label: "Brasilia Time",
    offset_minutes: -3 * 60,
};
const MANAUS: ZoneEntry = ZoneEntry {
    id: "America/Manaus",
    label: "Amazon Time",
    offset_minutes: -4 * 60,
};
const RIO_BRANCO: ZoneEntry = ZoneEntry {
    id: "America/Rio_Branco",
    label: "Acre Time",
    offset_minutes: -5 * 60,
};
const MADRID: ZoneEntry = ZoneEntry {
    id: "Europe/Madrid",
    label: "Peninsular Spain Time",
    offset_minutes: 60,
};
const CANARY: ZoneEntry = ZoneEntry {
    id: "Atlantic/Canary",
    label: "Canary Islands Time",
    offset_minutes: 0,
};

const US_ZONES: &[ZoneEntry] = &[EASTERN, CENTRAL, MOUNTAIN, PACIFIC];

const ALL_ZONES: &[ZoneEntry] = &[
    EASTERN,
    CENTRAL,
    MOUNTAIN,
    PACIFIC,
    LA_PAZ,
    LIMA,
    BOGOTA,
    GUAYAQUIL,
    CARACAS,
    BUENOS_AIRES,
    MONTEVIDEO,
    ASUNCION,
    SANTIAGO,
    EASTER_ISLAND,
    GUATEMALA,
    COSTA_RICA,
    PANAMA,
    SANTO_DOMINGO,
    MEXICO_CITY,
    MAZATLAN,
    TIJUANA,
    CANCUN,
    SAO_PAULO,
    MANAUS,
    RIO_BRANCO,
    MADRID,
    CANARY,
];

/// Ordered zones for a country (and, for the United States, a state).
///
/// Unknown locations return `None`; callers fall back to a configured
/// default or prompt the user, this table never guesses.
pub fn timezones_for(country: &str, state: Option<&str>) -> Option<&'static [ZoneEntry]> {
    let country = country.trim().to_ascii_uppercase();
    let state = state.map(|value| value.trim().to_ascii_uppercase());

    match (country.as_str(), state.as_deref()) {
        ("US", None) => Some(US_ZONES),
        ("US", Some(state)) => us_state_zones(state),
        // State subdivisions are only meaningful for the US table; any other
        // country ignores the qualifier.
        ("BO", _) => Some(&[LA_PAZ]),
        ("PE", _) => Some(&[LIMA]),
        ("CO", _) => Some(&[BOGOTA]),
        ("EC", _) => Some(&[GUAYAQUIL]),
        ("VE", _) => Some(&[CARACAS]),
        ("AR", _) => Some(&[BUENOS_AIRES]),
        ("UY", _) => Some(&[MONTEVIDEO]),
        ("PY", _) => Some(&[ASUNCION]),
        ("CL", _) => Some(&[SANTIAGO, EASTER_ISLAND]),
        ("GT", _) => Some(&[GUATEMALA]),
        ("CR", _) => Some(&[COSTA_RICA]),
        ("PA", _) => Some(&[PANAMA]),
        ("DO", _) => Some(&[SANTO_DOMINGO]),
        ("MX", _) => Some(&[MEXICO_CITY, MAZATLAN, TIJUANA, CANCUN]),
        ("BR", _) => Some(&[SAO_PAULO, MANAUS, RIO_BRANCO]),
        ("ES", _) => Some(&[MADRID, CANARY]),
        _ => None,
    }
}

fn us_state_zones(state: &str) -> Option<&'static [ZoneEntry]> {
    match state {
        "CT" | "DE" | "GA" | "MA" | "MD" | "ME" | "NC" | "NH" | "NJ" | "NY" | "OH" | "PA"
        | "RI" | "SC" | "VA" | "VT" | "WV" => Some(&[EASTERN]),
        "AL" | "AR" | "IA" | "IL" | "LA" | "MN" | "MO" | "MS" | "OK" | "WI" => Some(&[CENTRAL]),
        "TX" => Some(&[CENTRAL, MOUNTAIN]),
        "FL" | "TN" | "KY" | "IN" => Some(&[EASTERN, CENTRAL]),
        "KS" | "NE" | "ND" | "SD" => Some(&[CENTRAL, MOUNTAIN]),
        "AZ" | "CO" | "MT" | "NM" | "UT" | "WY" => Some(&[MOUNTAIN]),
        "ID" | "OR" => Some(&[MOUNTAIN, PACIFIC]),
        "CA" | "NV" | "WA" => Some(&[PACIFIC]),
        _ => None,
    }
}

/// Whether a location needs an explicit zone selection before persisting a
/// posting's `timezone` field.
pub fn has_multiple_timezones(country: &str, state: Option<&str>) -> bool {
    timezones_for(country, state)
        .map(|zones| zones.len() > 1)
        .unwrap_or(false)
}

/// Resolve a zone identifier against the full table.
pub fn zone(id: &str) -> Option<&'static ZoneEntry> {
    ALL_ZONES.iter().find(|entry| entry.id == id)
}

/// Wall-clock time in `zone_id` to the equivalent UTC instant.
pub fn convert_to_utc(local: NaiveDateTime, zone_id: &str) -> Result<DateTime<Utc>, SchedulingError> {
    let entry = zone(zone_id).ok_or_else(|| SchedulingError::UnknownZone {
        id: zone_id.to_string(),
    })?;
    let offset = entry.fixed_offset().ok_or_else(|| SchedulingError::UnknownZone {
        id: zone_id.to_string(),
    })?;

    // A fixed offset maps every wall-clock time to exactly one instant.
    let localized = offset
        .from_local_datetime(&local)
        .single()
        .ok_or_else(|| SchedulingError::UnknownZone {
            id: zone_id.to_string(),
        })?;
    Ok(localized.with_timezone(&Utc))
}

/// UTC instant to the wall-clock time in `zone_id`. Inverse of
/// [`convert_to_utc`].
pub fn convert_from_utc(utc: DateTime<Utc>, zone_id: &str) -> Result<NaiveDateTime, SchedulingError> {
    let entry = zone(zone_id).ok_or_else(|| SchedulingError::UnknownZone {
        id: zone_id.to_string(),
    })?;
    let offset = entry.fixed_offset().ok_or_else(|| SchedulingError::UnknownZone {
        id: zone_id.to_string(),
    })?;
    Ok(utc.with_timezone(&offset).naive_local())
}
