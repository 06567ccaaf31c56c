// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

#[macro_use]
extern crate log;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate getset;
#[macro_use]
extern crate derive_new;
#[cfg(test)]
#[macro_use]
extern crate approx;

pub mod annotation;
pub mod calls;
pub mod cli;
pub mod errors;
pub mod overlap;
pub mod regions;
pub(crate) mod utils;
