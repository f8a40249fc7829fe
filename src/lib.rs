// SPDX-License-Identifier: Apache-2.0

pub mod aig;

pub mod load_aiger;

pub mod cut;

pub mod cut_set;

pub mod cut_engine;

pub mod tech_map;

pub mod error;
