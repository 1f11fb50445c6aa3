//! Personal environmental-footprint estimation.
//!
//! A pure mapping from a household-lifestyle profile to annual carbon
//! output, daily water use, and land demand, plus threshold-based
//! recommendations. No I/O, no state: identical profiles always yield
//! identical results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// kg CO2 for an average round-trip flight.
const FLIGHT_CO2_KG: f64 = 1100.0;
/// kg CO2 per year of household waste before adjustments.
const WASTE_BASE_CO2_KG: f64 = 1100.0;
/// Liters per day of direct use (showering, drinking, ...).
const WATER_BASE_LITERS: f64 = 150.0;
/// Global hectares for housing and infrastructure.
const LAND_BASE_HECTARES: f64 = 0.2;
/// Each percent of locally sourced food trims diet impact by 0.25%.
const LOCAL_FOOD_DISCOUNT: f64 = 0.0025;
/// Each percent of recycling trims waste impact by 0.5%.
const RECYCLING_DISCOUNT: f64 = 0.005;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub enum TransportMode {
    Car,
    ElectricCar,
    PublicTransport,
    Carpool,
    Bicycle,
    Walking,
    /// Anything unrecognized; estimated with the car factor.
    Other,
}

impl From<Value> for TransportMode {
    fn from(raw: Value) -> Self {
        match raw.as_str() {
            Some("car") => TransportMode::Car,
            Some("electric_car") => TransportMode::ElectricCar,
            Some("public_transport") => TransportMode::PublicTransport,
            Some("carpool") => TransportMode::Carpool,
            Some("bicycle") => TransportMode::Bicycle,
            Some("walking") => TransportMode::Walking,
            _ => TransportMode::Other,
        }
    }
}

impl TransportMode {
    fn co2_kg_per_km(self) -> f64 {
        match self {
            TransportMode::Car | TransportMode::Other => 0.192,
            TransportMode::ElectricCar => 0.053,
            TransportMode::PublicTransport => 0.058,
            TransportMode::Carpool => 0.096,
            TransportMode::Bicycle | TransportMode::Walking => 0.0,
        }
    }

    fn is_high_impact(self) -> bool {
        matches!(self, TransportMode::Car | TransportMode::ElectricCar)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub enum EnergySource {
    Grid,
    Renewable,
    NaturalGas,
    Oil,
    Mixed,
    /// Anything unrecognized; estimated with the grid factor.
    Other,
}

impl From<Value> for EnergySource {
    fn from(raw: Value) -> Self {
        match raw.as_str() {
            Some("grid") => EnergySource::Grid,
            Some("renewable") => EnergySource::Renewable,
            Some("natural_gas") => EnergySource::NaturalGas,
            Some("oil") => EnergySource::Oil,
            Some("mixed") => EnergySource::Mixed,
            _ => EnergySource::Other,
        }
    }
}

impl EnergySource {
    /// kg CO2 per square meter per day.
    fn co2_kg_per_sqm_day(self) -> f64 {
        match self {
            EnergySource::Grid | EnergySource::Other => 0.3,
            EnergySource::Renewable => 0.02,
            EnergySource::NaturalGas => 0.2,
            EnergySource::Oil => 0.35,
            EnergySource::Mixed => 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub enum DietType {
    MeatHeavy,
    MeatMedium,
    Pescatarian,
    Vegetarian,
    Vegan,
    /// Anything unrecognized; estimated with the meat_medium factors.
    Other,
}

impl From<Value> for DietType {
    fn from(raw: Value) -> Self {
        match raw.as_str() {
            Some("meat_heavy") => DietType::MeatHeavy,
            Some("meat_medium") => DietType::MeatMedium,
            Some("pescatarian") => DietType::Pescatarian,
            Some("vegetarian") => DietType::Vegetarian,
            Some("vegan") => DietType::Vegan,
            _ => DietType::Other,
        }
    }
}

impl DietType {
    fn co2_kg_per_day(self) -> f64 {
        match self {
            DietType::MeatHeavy => 7.9,
            DietType::MeatMedium | DietType::Other => 5.1,
            DietType::Pescatarian => 3.9,
            DietType::Vegetarian => 3.3,
            DietType::Vegan => 2.5,
        }
    }

    fn water_liters_per_day(self) -> f64 {
        match self {
            DietType::MeatHeavy => 5000.0,
            DietType::MeatMedium | DietType::Other => 3800.0,
            DietType::Pescatarian => 2800.0,
            DietType::Vegetarian => 2200.0,
            DietType::Vegan => 1700.0,
        }
    }

    fn land_global_hectares(self) -> f64 {
        match self {
            DietType::MeatHeavy => 2.0,
            DietType::MeatMedium | DietType::Other => 1.2,
            DietType::Pescatarian => 0.8,
            DietType::Vegetarian => 0.6,
            DietType::Vegan => 0.4,
        }
    }

    fn is_high_impact(self) -> bool {
        matches!(self, DietType::MeatHeavy | DietType::MeatMedium)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub enum ShoppingFrequency {
    Minimal,
    Moderate,
    Frequent,
    VeryFrequent,
    /// Anything unrecognized; estimated with the moderate multiplier.
    Other,
}

impl From<Value> for ShoppingFrequency {
    fn from(raw: Value) -> Self {
        match raw.as_str() {
            Some("minimal") => ShoppingFrequency::Minimal,
            Some("moderate") => ShoppingFrequency::Moderate,
            Some("frequent") => ShoppingFrequency::Frequent,
            Some("very_frequent") => ShoppingFrequency::VeryFrequent,
            _ => ShoppingFrequency::Other,
        }
    }
}

impl ShoppingFrequency {
    fn waste_multiplier(self) -> f64 {
        match self {
            ShoppingFrequency::Minimal => 0.5,
            ShoppingFrequency::Moderate | ShoppingFrequency::Other => 1.0,
            ShoppingFrequency::Frequent => 1.5,
            ShoppingFrequency::VeryFrequent => 2.0,
        }
    }

    fn is_high_frequency(self) -> bool {
        matches!(self, ShoppingFrequency::Frequent | ShoppingFrequency::VeryFrequent)
    }
}

/// Lifestyle inputs. Every field is optional in the JSON body; documented
/// defaults apply both to absent fields and to unrecognized categorical
/// values.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImpactProfile {
    pub transportation_type: TransportMode,
    /// Daily commute, km.
    pub commute_distance: f64,
    pub flights_per_year: i64,
    /// Square meters.
    pub home_size: f64,
    pub household_members: i64,
    pub energy_source: EnergySource,
    pub diet_type: DietType,
    /// Percent of food sourced locally.
    pub local_food_percent: f64,
    /// Percent of waste recycled.
    pub recycling_rate: f64,
    pub shopping_frequency: ShoppingFrequency,
}

impl Default for ImpactProfile {
    fn default() -> Self {
        Self {
            transportation_type: TransportMode::Car,
            commute_distance: 20.0,
            flights_per_year: 2,
            home_size: 100.0,
            household_members: 2,
            energy_source: EnergySource::Grid,
            diet_type: DietType::MeatMedium,
            local_food_percent: 30.0,
            recycling_rate: 50.0,
            shopping_frequency: ShoppingFrequency::Moderate,
        }
    }
}

/// Carbon breakdown by category, tons CO2 per year, rounded to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Breakdown {
    pub transportation: f64,
    pub flights: f64,
    pub home_energy: f64,
    pub diet: f64,
    pub waste: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactLevel {
    High,
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub category: &'static str,
    pub impact: ImpactLevel,
    pub title: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactResult {
    /// Tons CO2 per year.
    pub carbon_footprint: f64,
    /// Liters per day.
    pub water_footprint: f64,
    /// Global hectares.
    pub land_footprint: f64,
    pub breakdown: Breakdown,
    pub recommendations: Vec<Recommendation>,
}

/// Estimate the annual footprint for a profile.
///
/// Out-of-range numeric inputs are clamped to their valid ranges rather than
/// rejected, so the estimator never refuses a request.
pub fn estimate(profile: &ImpactProfile) -> ImpactResult {
    let commute_km = profile.commute_distance.max(0.0);
    let flights = profile.flights_per_year.max(0);
    let home_sqm = profile.home_size.max(0.0);
    let members = profile.household_members.max(1);
    let local_food = profile.local_food_percent.clamp(0.0, 100.0);
    let recycling = profile.recycling_rate.clamp(0.0, 100.0);

    let transportation = commute_km * 365.0 * profile.transportation_type.co2_kg_per_km();
    let flights_kg = flights as f64 * FLIGHT_CO2_KG;
    let home_energy =
        home_sqm * 365.0 * profile.energy_source.co2_kg_per_sqm_day() / members as f64;
    let diet =
        365.0 * profile.diet_type.co2_kg_per_day() * (1.0 - local_food * LOCAL_FOOD_DISCOUNT);
    let waste = WASTE_BASE_CO2_KG
        * (1.0 - recycling * RECYCLING_DISCOUNT)
        * profile.shopping_frequency.waste_multiplier();

    let total_kg = transportation + flights_kg + home_energy + diet + waste;

    ImpactResult {
        carbon_footprint: round2(total_kg / 1000.0),
        water_footprint: (WATER_BASE_LITERS + profile.diet_type.water_liters_per_day()).round(),
        land_footprint: round2(LAND_BASE_HECTARES + profile.diet_type.land_global_hectares()),
        breakdown: Breakdown {
            transportation: round2(transportation / 1000.0),
            flights: round2(flights_kg / 1000.0),
            home_energy: round2(home_energy / 1000.0),
            diet: round2(diet / 1000.0),
            waste: round2(waste / 1000.0),
        },
        recommendations: recommendations(profile),
    }
}

/// Threshold rules evaluated in a fixed order; every matching rule fires.
fn recommendations(profile: &ImpactProfile) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    if profile.transportation_type.is_high_impact() {
        recs.push(Recommendation {
            category: "transport",
            impact: ImpactLevel::High,
            title: "Consider public transit or carpooling",
            description: "Taking public transportation or sharing rides can reduce your carbon footprint significantly.",
        });
    }

    if profile.flights_per_year > 3 {
        recs.push(Recommendation {
            category: "transport",
            impact: ImpactLevel::High,
            title: "Reduce air travel",
            description: "Consider fewer flights or alternatives like train travel for shorter distances.",
        });
    }

    if profile.energy_source != EnergySource::Renewable {
        recs.push(Recommendation {
            category: "energy",
            impact: ImpactLevel::High,
            title: "Switch to renewable energy",
            description: "Consider solar panels or a renewable energy provider for your home electricity.",
        });
    }

    if profile.diet_type.is_high_impact() {
        recs.push(Recommendation {
            category: "diet",
            impact: ImpactLevel::High,
            title: "Reduce meat consumption",
            description: "Try incorporating more plant-based meals into your diet to reduce your environmental impact.",
        });
    }

    if profile.local_food_percent < 40.0 {
        recs.push(Recommendation {
            category: "diet",
            impact: ImpactLevel::Medium,
            title: "Choose local and seasonal foods",
            description: "Buying locally produced food reduces transportation emissions and supports local farmers.",
        });
    }

    if profile.recycling_rate < 60.0 {
        recs.push(Recommendation {
            category: "waste",
            impact: ImpactLevel::Medium,
            title: "Increase recycling efforts",
            description: "Try to recycle more of your waste and compost food scraps if possible.",
        });
    }

    if profile.shopping_frequency.is_high_frequency() {
        recs.push(Recommendation {
            category: "waste",
            impact: ImpactLevel::Medium,
            title: "Reduce consumption",
            description: "Consider buying fewer items and focusing on quality, durable products that last longer.",
        });
    }

    recs
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
