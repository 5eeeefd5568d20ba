// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::Parser;

fn main() {
    // Run driftcal, only returning a useful error message if there was one.
    if let Err(e) = lwa_driftcal::Driftcal::parse().run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
