use serde::{Deserialize, Serialize};
use std::fmt;

/// Hardware families that receive firmware through this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceModel {
    DevKit1,
    DevKit2,
    OpenGlass,
    Cv1,
}

/// Model names reported by devices, matched exactly.
const MODEL_ALIASES: &[(&str, DeviceModel)] = &[
    ("Omi DevKit 2", DeviceModel::DevKit2),
    ("Friend DevKit 1", DeviceModel::DevKit1),
    ("Friend", DeviceModel::DevKit1),
    ("OpenGlass", DeviceModel::OpenGlass),
    ("Omi CV 1", DeviceModel::Cv1),
    ("OMI_shell", DeviceModel::Cv1),
    ("nrf5340", DeviceModel::Cv1),
];

impl DeviceModel {
    pub const ALL: [DeviceModel; 4] = [
        DeviceModel::DevKit1,
        DeviceModel::DevKit2,
        DeviceModel::OpenGlass,
        DeviceModel::Cv1,
    ];

    /// Resolve the model name a device reports. Unknown names yield `None`.
    pub fn from_model_name(model_name: &str) -> Option<Self> {
        MODEL_ALIASES
            .iter()
            .find(|(alias, _)| *alias == model_name)
            .map(|(_, device)| *device)
    }

    /// Prefix of the release tags published for this device.
    pub fn release_prefix(&self) -> &'static str {
        match self {
            DeviceModel::DevKit1 => "Friend",
            DeviceModel::DevKit2 => "Omi_DK2",
            DeviceModel::OpenGlass => "OpenGlass",
            DeviceModel::Cv1 => "Omi_CV1",
        }
    }

    pub fn id(&self) -> u8 {
        match self {
            DeviceModel::DevKit1 => 1,
            DeviceModel::DevKit2 => 2,
            DeviceModel::OpenGlass => 3,
            DeviceModel::Cv1 => 4,
        }
    }

    pub fn aliases(&self) -> impl Iterator<Item = &'static str> + '_ {
        MODEL_ALIASES
            .iter()
            .filter(move |(_, device)| device == self)
            .map(|(alias, _)| *alias)
    }
}

impl fmt::Display for DeviceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceModel::DevKit1 => "Omi DevKit 1",
            DeviceModel::DevKit2 => "Omi DevKit 2",
            DeviceModel::OpenGlass => "OpenGlass",
            DeviceModel::Cv1 => "Omi CV 1",
        };
        write!(f, "{}", name)
    }
}
