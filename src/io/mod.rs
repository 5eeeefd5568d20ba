// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Finding input files and writing gain corrections.

mod glob;
pub(crate) mod write;

pub(crate) use self::glob::{glob_files, single_glob_file, GlobError};
