use std::fmt::Display;

use num_enum::TryFromPrimitive;
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Melee characters, keyed by their external (character select) id as it appears
/// in replay game start blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, TryFromPrimitive, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum MeleeCharacter {
    CaptainFalcon = 0,
    DonkeyKong = 1,
    Fox = 2,
    MrGameAndWatch = 3,
    Kirby = 4,
    Bowser = 5,
    Link = 6,
    Luigi = 7,
    Mario = 8,
    Marth = 9,
    Mewtwo = 10,
    Ness = 11,
    Peach = 12,
    Pikachu = 13,
    IceClimbers = 14,
    Jigglypuff = 15,
    Samus = 16,
    Yoshi = 17,
    Zelda = 18,
    Sheik = 19,
    Falco = 20,
    YoungLink = 21,
    DrMario = 22,
    Roy = 23,
    Pichu = 24,
    Ganondorf = 25,
}

impl Display for MeleeCharacter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::CaptainFalcon => write!(f, "Captain Falcon"),
            Self::DonkeyKong => write!(f, "Donkey Kong"),
            Self::Fox => write!(f, "Fox"),
            Self::MrGameAndWatch => write!(f, "Mr. Game & Watch"),
            Self::Kirby => write!(f, "Kirby"),
            Self::Bowser => write!(f, "Bowser"),
            Self::Link => write!(f, "Link"),
            Self::Luigi => write!(f, "Luigi"),
            Self::Mario => write!(f, "Mario"),
            Self::Marth => write!(f, "Marth"),
            Self::Mewtwo => write!(f, "Mewtwo"),
            Self::Ness => write!(f, "Ness"),
            Self::Peach => write!(f, "Peach"),
            Self::Pikachu => write!(f, "Pikachu"),
            Self::IceClimbers => write!(f, "Ice Climbers"),
            Self::Jigglypuff => write!(f, "Jigglypuff"),
            Self::Samus => write!(f, "Samus"),
            Self::Yoshi => write!(f, "Yoshi"),
            Self::Zelda => write!(f, "Zelda"),
            Self::Sheik => write!(f, "Sheik"),
            Self::Falco => write!(f, "Falco"),
            Self::YoungLink => write!(f, "Young Link"),
            Self::DrMario => write!(f, "Dr. Mario"),
            Self::Roy => write!(f, "Roy"),
            Self::Pichu => write!(f, "Pichu"),
            Self::Ganondorf => write!(f, "Ganondorf"),
        }
    }
}
