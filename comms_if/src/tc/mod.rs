//! # Telecommand module
//!
//! This module provides telecommand functionality to the communications
//! interface. Telecommands may arrive from two sources:
//!
//! - dive scripts, in which each TC is a JSON object (see [`Tc::from_json`])
//! - the interactive console, in which each TC is a line of argv-style words
//!   (see [`Tc::from_words`]).

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod arm;
pub mod mnvr;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use structopt::clap::AppSettings;
use structopt::StructOpt;
use thiserror::Error;

// Internal
use arm::ArmInputs;
use mnvr::MnvrCmd;

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the vehicle by the operator.
#[derive(Debug, Clone, Serialize, Deserialize, StructOpt)]
#[serde(tag = "type", content = "payload")]
pub enum Tc {
    /// A motion manoeuvre to be executed by thruster control.
    ///
    /// Leading hyphens must be allowed at the subcommand level or clap
    /// mistakes negative demands for flags.
    #[structopt(name = "mnvr", setting = AppSettings::AllowLeadingHyphen)]
    #[serde(rename = "MNVR")]
    Mnvr(MnvrCmd),

    /// New operator inputs for arm control (triggers and bumpers).
    #[structopt(name = "arm")]
    #[serde(rename = "ARM")]
    Arm(ArmInputs),

    /// Stop all motion: thrusters to neutral, arm targets frozen.
    #[structopt(name = "stop")]
    #[serde(rename = "STOP")]
    Stop,

    /// Put the vehicle into safe mode.
    #[structopt(name = "safe")]
    #[serde(rename = "SAFE")]
    MakeSafe,

    /// Remove the safe mode previously requested by the operator.
    #[structopt(name = "unsafe")]
    #[serde(rename = "UNSAFE")]
    MakeUnsafe,

    /// Shut the executable down in an orderly fashion.
    #[structopt(name = "quit")]
    #[serde(rename = "QUIT")]
    Shutdown,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("TC is not a valid command line: {0}")]
    InvalidWords(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Tc {
    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)
    }

    /// Parse a new TC from a line of whitespace-separated words, as typed at
    /// the console.
    pub fn from_words(line: &str) -> Result<Self, TcParseError> {
        // structopt expects the binary name as the first item
        let words = std::iter::once("tc").chain(line.split_whitespace());

        Tc::from_iter_safe(words).map_err(|e| TcParseError::InvalidWords(e.message))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_tc_from_json() {
        let tc = Tc::from_json(
            r#"{"type": "MNVR", "payload": {"surge": 1.0, "sway": 0.0, "heave": 0.0, "yaw": 0.3}}"#,
        )
        .unwrap();

        match tc {
            Tc::Mnvr(cmd) => {
                assert_eq!(cmd.surge, 1.0);
                assert_eq!(cmd.yaw, 0.3);
            }
            _ => panic!("Expected a MNVR TC"),
        }

        assert!(matches!(
            Tc::from_json(r#"{"type": "STOP"}"#).unwrap(),
            Tc::Stop
        ));

        assert!(Tc::from_json("not json at all").is_err());
    }

    #[test]
    fn test_tc_from_words() {
        let tc = Tc::from_words("mnvr 0.5 0.0 -0.2 0.0").unwrap();

        match tc {
            Tc::Mnvr(cmd) => {
                assert_eq!(cmd.surge, 0.5);
                assert_eq!(cmd.heave, -0.2);
            }
            _ => panic!("Expected a MNVR TC"),
        }

        assert!(matches!(Tc::from_words("quit").unwrap(), Tc::Shutdown));
        assert!(Tc::from_words("fly me to the moon").is_err());
    }

    #[test]
    fn test_tc_from_words_negative_demands() {
        // Every DOF must accept a leading hyphen from the console
        let tc = Tc::from_words("mnvr -1.0 -0.5 -0.2 -0.3").unwrap();

        match tc {
            Tc::Mnvr(cmd) => {
                assert_eq!(cmd.surge, -1.0);
                assert_eq!(cmd.sway, -0.5);
                assert_eq!(cmd.heave, -0.2);
                assert_eq!(cmd.yaw, -0.3);
            }
            _ => panic!("Expected a MNVR TC"),
        }
    }
}
