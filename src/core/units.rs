//! Physical unit conversion over a fixed set of categories.
//!
//! Every linear category converts through its base unit (metre, kilogram,
//! square metre, metre per second, litre, pascal, joule, watt, second).
//! Temperature is affine and goes through Celsius instead.

use crate::core::conversion::ConversionResult;
use crate::core::error::ConversionError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Category {
    Length,
    Mass,
    Temperature,
    Area,
    Speed,
    Volume,
    Pressure,
    Energy,
    Power,
    Time,
}

const ALL_CATEGORIES: [Category; 10] = [
    Category::Length,
    Category::Mass,
    Category::Temperature,
    Category::Area,
    Category::Speed,
    Category::Volume,
    Category::Pressure,
    Category::Energy,
    Category::Power,
    Category::Time,
];

impl Category {
    /// Display name, as shown next to the unit tables.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Length => "Длина",
            Category::Mass => "Масса",
            Category::Temperature => "Температура",
            Category::Area => "Площадь",
            Category::Speed => "Скорость",
            Category::Volume => "Объем",
            Category::Pressure => "Давление",
            Category::Energy => "Энергия",
            Category::Power => "Мощность",
            Category::Time => "Время",
        }
    }

    /// ASCII identifier, handy on the command line.
    pub fn id(&self) -> &'static str {
        match self {
            Category::Length => "length",
            Category::Mass => "mass",
            Category::Temperature => "temperature",
            Category::Area => "area",
            Category::Speed => "speed",
            Category::Volume => "volume",
            Category::Pressure => "pressure",
            Category::Energy => "energy",
            Category::Power => "power",
            Category::Time => "time",
        }
    }

    pub fn units(&self) -> &'static [UnitDef] {
        match self {
            Category::Length => LENGTH,
            Category::Mass => MASS,
            Category::Temperature => TEMPERATURE,
            Category::Area => AREA,
            Category::Speed => SPEED,
            Category::Volume => VOLUME,
            Category::Pressure => PRESSURE,
            Category::Energy => ENERGY,
            Category::Power => POWER,
            Category::Time => TIME,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ALL_CATEGORIES
            .iter()
            .find(|c| c.id() == wanted || c.name().to_lowercase() == wanted)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("Invalid unit category: {}", s))
    }
}

/// How a unit relates to its category's base unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// Multiplier to the base unit; strictly positive.
    Linear(f64),
    /// Non-linear unit handled by a bespoke formula.
    Affine,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitDef {
    pub code: &'static str,
    pub name: &'static str,
    pub scale: Scale,
}

const fn linear(code: &'static str, factor: f64, name: &'static str) -> UnitDef {
    UnitDef {
        code,
        name,
        scale: Scale::Linear(factor),
    }
}

const fn affine(code: &'static str, name: &'static str) -> UnitDef {
    UnitDef {
        code,
        name,
        scale: Scale::Affine,
    }
}

const CELSIUS: &str = "°C";
const FAHRENHEIT: &str = "°F";
const KELVIN: &str = "K";

const LENGTH: &[UnitDef] = &[
    linear("мм", 0.001, "миллиметр"),
    linear("см", 0.01, "сантиметр"),
    linear("м", 1.0, "метр"),
    linear("км", 1000.0, "километр"),
    linear("дюйм", 0.0254, "дюйм"),
    linear("фут", 0.3048, "фут"),
    linear("ярд", 0.9144, "ярд"),
    linear("миля", 1609.34, "миля"),
    linear("морская миля", 1852.0, "морская миля"),
];

const MASS: &[UnitDef] = &[
    linear("мг", 0.000001, "миллиграмм"),
    linear("г", 0.001, "грамм"),
    linear("кг", 1.0, "килограмм"),
    linear("т", 1000.0, "тонна"),
    linear("центнер", 100.0, "центнер"),
    linear("унция", 0.0283495, "унция"),
    linear("фунт", 0.453592, "фунт"),
    linear("карат", 0.0002, "карат"),
];

const TEMPERATURE: &[UnitDef] = &[
    affine(CELSIUS, "градус Цельсия"),
    affine(FAHRENHEIT, "градус Фаренгейта"),
    affine(KELVIN, "Кельвин"),
];

const AREA: &[UnitDef] = &[
    linear("мм²", 0.000001, "квадратный миллиметр"),
    linear("см²", 0.0001, "квадратный сантиметр"),
    linear("м²", 1.0, "квадратный метр"),
    linear("км²", 1000000.0, "квадратный километр"),
    linear("га", 10000.0, "гектар"),
    linear("сотка", 100.0, "сотка"),
    linear("акр", 4046.86, "акр"),
    linear("фут²", 0.092903, "квадратный фут"),
    linear("дюйм²", 0.00064516, "квадратный дюйм"),
];

const SPEED: &[UnitDef] = &[
    linear("м/с", 1.0, "метр в секунду"),
    linear("км/ч", 0.277778, "километр в час"),
    linear("миль/ч", 0.44704, "миля в час"),
    linear("узлы", 0.514444, "узел"),
    linear("фут/с", 0.3048, "фут в секунду"),
];

const VOLUME: &[UnitDef] = &[
    linear("мл", 0.001, "миллилитр"),
    linear("л", 1.0, "литр"),
    linear("м³", 1000.0, "кубический метр"),
    linear("см³", 0.001, "кубический сантиметр"),
    linear("галлон US", 3.78541, "американский галлон"),
    linear("галлон UK", 4.54609, "английский галлон"),
    linear("пинта US", 0.473176, "американская пинта"),
    linear("пинта UK", 0.568261, "английская пинта"),
    linear("жидкая унция", 0.0295735, "жидкая унция"),
    linear("баррель нефтяной", 158.987, "нефтяной баррель"),
];

const PRESSURE: &[UnitDef] = &[
    linear("Па", 1.0, "Паскаль"),
    linear("кПа", 1000.0, "килоПаскаль"),
    linear("МПа", 1000000.0, "мегаПаскаль"),
    linear("бар", 100000.0, "бар"),
    linear("атм", 101325.0, "атмосфера"),
    linear("мм рт.ст.", 133.322, "миллиметр ртутного столба"),
    linear("psi", 6894.76, "фунт-сила на квадратный дюйм"),
];

const ENERGY: &[UnitDef] = &[
    linear("Дж", 1.0, "Джоуль"),
    linear("кДж", 1000.0, "килоДжоуль"),
    linear("МДж", 1000000.0, "мегаДжоуль"),
    linear("ккал", 4184.0, "килокалория"),
    linear("кал", 4.184, "калория"),
    linear("кВт·ч", 3600000.0, "киловатт-час"),
    linear("эВ", 1.60218e-19, "электронвольт"),
];

const POWER: &[UnitDef] = &[
    linear("Вт", 1.0, "Ватт"),
    linear("кВт", 1000.0, "килоВатт"),
    linear("МВт", 1000000.0, "мегаВатт"),
    linear("л.с.", 735.499, "лошадиная сила"),
    linear("л.с. (англ.)", 745.7, "лошадиная сила (англ.)"),
];

const TIME: &[UnitDef] = &[
    linear("нс", 1e-9, "наносекунда"),
    linear("мкс", 1e-6, "микросекунда"),
    linear("мс", 0.001, "миллисекунда"),
    linear("с", 1.0, "секунда"),
    linear("мин", 60.0, "минута"),
    linear("ч", 3600.0, "час"),
    linear("день", 86400.0, "день"),
    linear("неделя", 604800.0, "неделя"),
    // 30 days
    linear("месяц", 2592000.0, "месяц"),
    // 365 days
    linear("год", 31536000.0, "год"),
];

/// Reverse index from unit code to its category and definition.
static UNIT_INDEX: LazyLock<HashMap<&'static str, (Category, &'static UnitDef)>> =
    LazyLock::new(|| {
        let mut index = HashMap::new();
        for category in ALL_CATEGORIES {
            for unit in category.units() {
                let previous = index.insert(unit.code, (category, unit));
                debug_assert!(
                    previous.is_none(),
                    "unit code {} registered in more than one category",
                    unit.code
                );
            }
        }
        index
    });

pub fn categories() -> &'static [Category] {
    &ALL_CATEGORIES
}

/// Unit codes of a category, in table order.
pub fn units_in(category: Category) -> Vec<&'static str> {
    category.units().iter().map(|unit| unit.code).collect()
}

pub fn unit_category(code: &str) -> Option<Category> {
    UNIT_INDEX.get(code).map(|(category, _)| *category)
}

/// Friendly name for a unit code, or the code itself when none is registered.
pub fn full_unit_name(code: &str) -> &str {
    UNIT_INDEX.get(code).map_or(code, |(_, unit)| unit.name)
}

pub fn convert(
    value: f64,
    from_unit: &str,
    to_unit: &str,
) -> Result<ConversionResult, ConversionError> {
    if !value.is_finite() {
        return Err(ConversionError::NonFiniteAmount(value));
    }

    let (from_category, from_def) = lookup(from_unit)?;
    let (to_category, to_def) = lookup(to_unit)?;

    if from_category != to_category {
        return Err(ConversionError::IncompatibleUnits {
            from: from_unit.to_string(),
            from_category: from_category.to_string(),
            to: to_unit.to_string(),
            to_category: to_category.to_string(),
        });
    }

    let result = if from_unit == to_unit {
        value
    } else {
        match (from_def.scale, to_def.scale) {
            (Scale::Linear(from_factor), Scale::Linear(to_factor)) => {
                value * from_factor / to_factor
            }
            _ => convert_temperature(value, from_unit, to_unit)?,
        }
    };
    let result = ConversionError::check_result(result, value, from_unit, to_unit)?;
    debug!(
        "Converted {} {} -> {} {} ({})",
        value, from_unit, result, to_unit, from_category
    );

    Ok(ConversionResult::unit(value, from_unit, to_unit, result, from_category))
}

fn lookup(code: &str) -> Result<(Category, &'static UnitDef), ConversionError> {
    UNIT_INDEX
        .get(code)
        .copied()
        .ok_or_else(|| ConversionError::UnknownUnit(code.to_string()))
}

/// Converts between Celsius, Fahrenheit and Kelvin by way of Celsius.
pub fn convert_temperature(
    value: f64,
    from_unit: &str,
    to_unit: &str,
) -> Result<f64, ConversionError> {
    let celsius = match from_unit {
        CELSIUS => value,
        FAHRENHEIT => (value - 32.0) * 5.0 / 9.0,
        KELVIN => value - 273.15,
        other => return Err(ConversionError::UnknownUnit(other.to_string())),
    };

    match to_unit {
        CELSIUS => Ok(celsius),
        FAHRENHEIT => Ok(celsius * 9.0 / 5.0 + 32.0),
        KELVIN => Ok(celsius + 273.15),
        other => Err(ConversionError::UnknownUnit(other.to_string())),
    }
}
