// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The four tracked stages and how each one is queried

use crate::config::PipelineIds;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Build-number substring selecting the NB flavour of the stage 2 pipeline
pub const NB_FILTER: &str = " - NB - ";

/// Build-number substring selecting the MTA flavour of the stage 2 pipeline
pub const MTA_FILTER: &str = " - MTA&Cancellation - ";

/// One of the four sequential stages a tracked build moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Stage1,
    Stage2Nb,
    Stage3,
    Stage2Mta,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Stage1,
        Stage::Stage2Nb,
        Stage::Stage3,
        Stage::Stage2Mta,
    ];

    /// Pipeline definition id queried for this stage.
    ///
    /// Both stage 2 flavours share one pipeline and are told apart by
    /// [`Stage::name_filter`].
    pub fn pipeline_id<'a>(&self, pipelines: &'a PipelineIds) -> &'a str {
        match self {
            Stage::Stage1 => &pipelines.stage1,
            Stage::Stage2Nb | Stage::Stage2Mta => &pipelines.stage2,
            Stage::Stage3 => &pipelines.stage3,
        }
    }

    pub fn name_filter(&self) -> Option<&'static str> {
        match self {
            Stage::Stage2Nb => Some(NB_FILTER),
            Stage::Stage2Mta => Some(MTA_FILTER),
            Stage::Stage1 | Stage::Stage3 => None,
        }
    }

    /// Stage 1 advances on any completed build; later stages also need success.
    pub fn requires_success(&self) -> bool {
        !matches!(self, Stage::Stage1)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Stage1 => "Stage 1",
            Stage::Stage2Nb => "Stage 2 - NB",
            Stage::Stage3 => "Stage 3",
            Stage::Stage2Mta => "Stage 2 - MTA",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
