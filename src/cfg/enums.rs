// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::models::request::SgFlags;

/// Boolean enumeration with string serialization support
///
/// Represents yes/no values with support for various string representations
/// including "Yes"/"No", "true"/"false", and "1"/"0".
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum YesNo {
    #[serde(
        rename = "Yes",
        alias = "yes",
        alias = "YES",
        alias = "true",
        alias = "True",
        alias = "1"
    )]
    Yes,
    #[serde(
        rename = "No",
        alias = "no",
        alias = "NO",
        alias = "false",
        alias = "False",
        alias = "0"
    )]
    No,
}
impl fmt::Display for YesNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        })
    }
}
impl From<bool> for YesNo {
    fn from(b: bool) -> Self {
        if b { YesNo::Yes } else { YesNo::No }
    }
}
impl YesNo {
    pub fn as_bool(self) -> bool {
        matches!(self, YesNo::Yes)
    }
}

/// Queue placement hint for the SG driver.
///
/// `Default` leaves the choice to the driver; `Head` and `Tail` set
/// `SG_FLAG_Q_AT_HEAD` / `SG_FLAG_Q_AT_TAIL`.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueuePosition {
    #[default]
    #[serde(rename = "Default", alias = "default", alias = "DEFAULT")]
    Default,
    #[serde(rename = "Head", alias = "head", alias = "HEAD")]
    Head,
    #[serde(rename = "Tail", alias = "tail", alias = "TAIL")]
    Tail,
}
impl fmt::Display for QueuePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QueuePosition::Default => "Default",
            QueuePosition::Head => "Head",
            QueuePosition::Tail => "Tail",
        })
    }
}
impl QueuePosition {
    pub fn flags(self) -> SgFlags {
        match self {
            QueuePosition::Default => SgFlags::empty(),
            QueuePosition::Head => SgFlags::Q_AT_HEAD,
            QueuePosition::Tail => SgFlags::Q_AT_TAIL,
        }
    }
}
