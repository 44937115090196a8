use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// Academic subject an ad teaches. Backend ids are 1-based in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    Mathematics,
    ForeignLanguage,
    Chemistry,
    Biology,
    Physics,
    Music,
    History,
    Art,
    ComputerScience,
    Geography,
    Other,
}

impl Subject {
    pub const ALL: [Subject; 11] = [
        Subject::Mathematics,
        Subject::ForeignLanguage,
        Subject::Chemistry,
        Subject::Biology,
        Subject::Physics,
        Subject::Music,
        Subject::History,
        Subject::Art,
        Subject::ComputerScience,
        Subject::Geography,
        Subject::Other,
    ];

    /// Display name as stored in the `subjects` table.
    pub fn name(self) -> &'static str {
        match self {
            Subject::Mathematics => "Matematyka",
            Subject::ForeignLanguage => "Język obcy",
            Subject::Chemistry => "Chemia",
            Subject::Biology => "Biologia",
            Subject::Physics => "Fizyka",
            Subject::Music => "Muzyka",
            Subject::History => "Historia",
            Subject::Art => "Plastyka",
            Subject::ComputerScience => "Informatyka",
            Subject::Geography => "Geografia",
            Subject::Other => "Inne",
        }
    }

    pub fn id(self) -> i64 {
        Self::ALL.iter().position(|s| *s == self).map_or(0, |i| i as i64 + 1)
    }

    pub fn from_id(id: i64) -> Option<Self> {
        usize::try_from(id - 1).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.name() == name.trim())
            .ok_or_else(|| ClientError::validation(format!("unknown subject: {name}")))
    }
}

/// Education level (category) an ad targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    PrimarySchool,
    SecondarySchool,
    VocationalSchool,
    University,
}

impl Scope {
    pub const ALL: [Scope; 4] = [
        Scope::PrimarySchool,
        Scope::SecondarySchool,
        Scope::VocationalSchool,
        Scope::University,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scope::PrimarySchool => "Szkoła Podstawowa",
            Scope::SecondarySchool => "Technikum/Liceum",
            Scope::VocationalSchool => "Szkoła zawodowa",
            Scope::University => "Studia",
        }
    }

    pub fn id(self) -> i64 {
        Self::ALL.iter().position(|s| *s == self).map_or(0, |i| i as i64 + 1)
    }

    pub fn from_id(id: i64) -> Option<Self> {
        usize::try_from(id - 1).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.name() == name.trim())
            .ok_or_else(|| ClientError::validation(format!("unknown category: {name}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_one_based_and_round_trip() {
        assert_eq!(Subject::Mathematics.id(), 1);
        assert_eq!(Subject::Other.id(), 11);
        assert_eq!(Subject::from_id(5), Some(Subject::Physics));
        assert_eq!(Subject::from_id(0), None);
        assert_eq!(Subject::from_id(12), None);

        assert_eq!(Scope::PrimarySchool.id(), 1);
        assert_eq!(Scope::from_id(4), Some(Scope::University));
        assert_eq!(Scope::from_id(-3), None);
    }

    #[test]
    fn lookup_by_display_name() {
        assert_eq!(Subject::from_name("Język obcy").unwrap(), Subject::ForeignLanguage);
        assert_eq!(Scope::from_name(" Studia ").unwrap(), Scope::University);
        assert!(matches!(
            Subject::from_name("Astrologia"),
            Err(ClientError::Validation(_))
        ));
    }
}
