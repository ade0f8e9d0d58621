//! Form boundary: typed property input, per-session field state and the
//! controller that turns a submitted form into a displayed price.

use crate::dataset::InferenceRecord;
use crate::error::{EstimatorError, Result};
use crate::pipeline::Estimator;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use tracing::info;

/// Field prefix for energy-performance indicators.
pub const PEB_FIELD: &str = "PEB";
/// Field prefix for building-state indicators.
pub const STATE_FIELD: &str = "StateOfBuilding";

/// Energy performance certificate class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Peb {
    APlusPlus,
    APlus,
    A,
    #[default]
    B,
    C,
    D,
    E,
    F,
    G,
    Unknown,
}

impl Peb {
    pub const ALL: [Peb; 10] = [
        Peb::APlusPlus,
        Peb::APlus,
        Peb::A,
        Peb::B,
        Peb::C,
        Peb::D,
        Peb::E,
        Peb::F,
        Peb::G,
        Peb::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Peb::APlusPlus => "A++",
            Peb::APlus => "A+",
            Peb::A => "A",
            Peb::B => "B",
            Peb::C => "C",
            Peb::D => "D",
            Peb::E => "E",
            Peb::F => "F",
            Peb::G => "G",
            Peb::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Peb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Peb {
    type Err = EstimatorError;

    /// Accepts `B`, `b` and the prefixed form `PEB_B`.
    fn from_str(s: &str) -> Result<Self> {
        let raw = strip_field_prefix(s.trim(), PEB_FIELD);
        Peb::ALL
            .into_iter()
            .find(|peb| peb.as_str().eq_ignore_ascii_case(raw))
            .ok_or_else(|| {
                EstimatorError::invalid_input(PEB_FIELD, format!("unknown energy class '{}'", s))
            })
    }
}

/// Condition of the building.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BuildingState {
    Good,
    ToBeDoneUp,
    #[default]
    AsNew,
    ToRenovate,
    ToRestore,
    JustRenovated,
}

impl BuildingState {
    pub const ALL: [BuildingState; 6] = [
        BuildingState::Good,
        BuildingState::ToBeDoneUp,
        BuildingState::AsNew,
        BuildingState::ToRenovate,
        BuildingState::ToRestore,
        BuildingState::JustRenovated,
    ];

    /// Category code as it appears in the training data.
    pub fn code(&self) -> &'static str {
        match self {
            BuildingState::Good => "GOOD",
            BuildingState::ToBeDoneUp => "TO_BE_DONE_UP",
            BuildingState::AsNew => "AS_NEW",
            BuildingState::ToRenovate => "TO_RENOVATE",
            BuildingState::ToRestore => "TO_RESTORE",
            BuildingState::JustRenovated => "JUST_RENOVATED",
        }
    }

    /// Human-readable label shown in the form.
    pub fn label(&self) -> &'static str {
        match self {
            BuildingState::Good => "Good",
            BuildingState::ToBeDoneUp => "To be done up",
            BuildingState::AsNew => "As new",
            BuildingState::ToRenovate => "To renovate",
            BuildingState::ToRestore => "To restore",
            BuildingState::JustRenovated => "Just renovated",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|state| state.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for BuildingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BuildingState {
    type Err = EstimatorError;

    /// Accepts a code (`TO_RENOVATE`), a prefixed code
    /// (`StateOfBuilding_TO_RENOVATE`) or a label (`To renovate`).
    fn from_str(s: &str) -> Result<Self> {
        let raw = strip_field_prefix(s.trim(), STATE_FIELD);
        Self::ALL
            .into_iter()
            .find(|state| state.code().eq_ignore_ascii_case(raw))
            .or_else(|| Self::from_label(raw))
            .ok_or_else(|| {
                EstimatorError::invalid_input(STATE_FIELD, format!("unknown building state '{}'", s))
            })
    }
}

fn strip_field_prefix<'a>(raw: &'a str, field: &str) -> &'a str {
    raw.strip_prefix(field)
        .and_then(|rest| rest.strip_prefix('_'))
        .unwrap_or(raw)
}

/// Typed property attributes as entered in the form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyForm {
    pub postal_code: u32,
    pub bathroom_count: u32,
    pub bedroom_count: u32,
    pub construction_year: u32,
    pub number_of_facades: u32,
    pub surface_of_plot: u32,
    pub living_area: u32,
    pub garden_area: u32,
    pub swimming_pool: bool,
    pub terrace: bool,
    pub fireplace: bool,
    pub furnished: bool,
    pub toilet_count: u32,
    pub room_count: u32,
    pub peb: Peb,
    pub state_of_building: BuildingState,
}

impl Default for PropertyForm {
    fn default() -> Self {
        Self {
            postal_code: 0,
            bathroom_count: 0,
            bedroom_count: 0,
            construction_year: 2024,
            number_of_facades: 0,
            surface_of_plot: 0,
            living_area: 0,
            garden_area: 0,
            swimming_pool: false,
            terrace: false,
            fireplace: false,
            furnished: false,
            toilet_count: 0,
            room_count: 0,
            peb: Peb::B,
            state_of_building: BuildingState::AsNew,
        }
    }
}

pub const BATHROOM_RANGE: RangeInclusive<u32> = 0..=10;
pub const BEDROOM_RANGE: RangeInclusive<u32> = 0..=10;
pub const CONSTRUCTION_YEAR_RANGE: RangeInclusive<u32> = 1800..=2034;
pub const FACADES_RANGE: RangeInclusive<u32> = 0..=4;
pub const TOILET_RANGE: RangeInclusive<u32> = 0..=10;
pub const ROOM_RANGE: RangeInclusive<u32> = 0..=30;

fn check_range(field: &str, value: u32, range: &RangeInclusive<u32>) -> Result<()> {
    if range.contains(&value) {
        return Ok(());
    }
    Err(EstimatorError::invalid_input(
        field,
        format!(
            "must be between {} and {}, got {}",
            range.start(),
            range.end(),
            value
        ),
    ))
}

impl PropertyForm {
    /// Enforce the bounded fields. Areas and the postal code are unsigned,
    /// so they are valid by construction.
    pub fn validate(&self) -> Result<()> {
        check_range("BathroomCount", self.bathroom_count, &BATHROOM_RANGE)?;
        check_range("BedroomCount", self.bedroom_count, &BEDROOM_RANGE)?;
        check_range(
            "ConstructionYear",
            self.construction_year,
            &CONSTRUCTION_YEAR_RANGE,
        )?;
        check_range("NumberOfFacades", self.number_of_facades, &FACADES_RANGE)?;
        check_range("ToiletCount", self.toilet_count, &TOILET_RANGE)?;
        check_range("RoomCount", self.room_count, &ROOM_RANGE)?;
        Ok(())
    }

    /// Record handed to the encoder: flags as 0/1, enums prefixed with their
    /// field name so they match the indicator column names.
    pub fn to_record(&self) -> InferenceRecord {
        InferenceRecord::new()
            .with("PostalCode", self.postal_code)
            .with("BathroomCount", self.bathroom_count)
            .with("BedroomCount", self.bedroom_count)
            .with("ConstructionYear", self.construction_year)
            .with("NumberOfFacades", self.number_of_facades)
            .with("SurfaceOfPlot", self.surface_of_plot)
            .with("LivingArea", self.living_area)
            .with("GardenArea", self.garden_area)
            .with("SwimmingPool", self.swimming_pool)
            .with("Terrace", self.terrace)
            .with("Fireplace", self.fireplace)
            .with("Furnished", self.furnished)
            .with("ToiletCount", self.toilet_count)
            .with("RoomCount", self.room_count)
            .with(PEB_FIELD, format!("{}_{}", PEB_FIELD, self.peb.as_str()))
            .with(
                STATE_FIELD,
                format!("{}_{}", STATE_FIELD, self.state_of_building.code()),
            )
    }
}

fn parse_count(field: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|e| EstimatorError::invalid_input(field, format!("'{}': {}", value, e)))
}

fn parse_flag(field: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        other => Err(EstimatorError::invalid_input(
            field,
            format!("'{}' is not a yes/no value", other),
        )),
    }
}

/// Explicit per-session form store.
///
/// Starts from the form defaults; text edits go through
/// [`SessionState::set_field`] and a successful submit overwrites everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    form: PropertyForm,
    submissions: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> &PropertyForm {
        &self.form
    }

    /// Number of forms stored through submit.
    pub fn submissions(&self) -> u64 {
        self.submissions
    }

    /// Update one field from text. Field names match either the record
    /// column (`LivingArea`) or its snake_case form (`living_area`).
    ///
    /// The value is only parsed here; ranges are checked on submit.
    pub fn set_field(&mut self, name: &str, value: &str) -> Result<()> {
        let key: String = name
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let form = &mut self.form;
        match key.as_str() {
            "postalcode" => form.postal_code = parse_count("PostalCode", value)?,
            "bathroomcount" => form.bathroom_count = parse_count("BathroomCount", value)?,
            "bedroomcount" => form.bedroom_count = parse_count("BedroomCount", value)?,
            "constructionyear" => form.construction_year = parse_count("ConstructionYear", value)?,
            "numberoffacades" => form.number_of_facades = parse_count("NumberOfFacades", value)?,
            "surfaceofplot" => form.surface_of_plot = parse_count("SurfaceOfPlot", value)?,
            "livingarea" => form.living_area = parse_count("LivingArea", value)?,
            "gardenarea" => form.garden_area = parse_count("GardenArea", value)?,
            "swimmingpool" => form.swimming_pool = parse_flag("SwimmingPool", value)?,
            "terrace" => form.terrace = parse_flag("Terrace", value)?,
            "fireplace" => form.fireplace = parse_flag("Fireplace", value)?,
            "furnished" => form.furnished = parse_flag("Furnished", value)?,
            "toiletcount" => form.toilet_count = parse_count("ToiletCount", value)?,
            "roomcount" => form.room_count = parse_count("RoomCount", value)?,
            "peb" => form.peb = value.parse()?,
            "stateofbuilding" => form.state_of_building = value.parse()?,
            _ => return Err(EstimatorError::invalid_input(name, "unknown field")),
        }
        Ok(())
    }

    /// Apply a line of `field=value` pairs, all or nothing.
    ///
    /// A word without `=` continues the previous value, so labels such as
    /// `StateOfBuilding=To be done up` need no quoting. Surrounding double
    /// quotes are stripped. On any error the session is left unchanged.
    pub fn apply_line(&mut self, line: &str) -> Result<()> {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        for word in line.split_whitespace() {
            if let Some((name, value)) = word.split_once('=') {
                pairs.push((name, value.to_string()));
            } else if let Some((_, value)) = pairs.last_mut() {
                value.push(' ');
                value.push_str(word);
            } else {
                return Err(EstimatorError::invalid_input(word, "expected field=value"));
            }
        }

        let mut scratch = self.clone();
        for (name, value) in &pairs {
            let value = value.trim_matches('"');
            scratch.set_field(name, value)?;
        }
        self.form = scratch.form;
        Ok(())
    }

    /// Replace the stored form.
    pub fn store(&mut self, form: PropertyForm) {
        self.form = form;
        self.submissions += 1;
    }
}

/// Two decimals followed by the currency suffix.
pub fn format_price(price: f64, currency: &str) -> String {
    format!("{:.2} {}", price, currency)
}

/// Connects a session to the estimator.
#[derive(Debug)]
pub struct FormController {
    estimator: Estimator,
    session: SessionState,
    currency: String,
}

impl FormController {
    pub fn new(estimator: Estimator, currency: impl Into<String>) -> Self {
        Self {
            estimator,
            session: SessionState::new(),
            currency: currency.into(),
        }
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionState {
        &mut self.session
    }

    /// Validate `form`, store it in the session and return the formatted estimate.
    ///
    /// Invalid forms are rejected before anything is stored.
    pub fn submit(&mut self, form: PropertyForm) -> Result<String> {
        form.validate()?;
        let record = form.to_record();
        self.session.store(form);

        let price = self.estimator.estimate(&record)?;
        let shown = format_price(price, &self.currency);
        info!(submissions = self.session.submissions(), price = %shown, "form submitted");
        Ok(shown)
    }

    /// Submit the form currently held by the session.
    pub fn submit_session(&mut self) -> Result<String> {
        let form = self.session.form().clone();
        self.submit(form)
    }
}
