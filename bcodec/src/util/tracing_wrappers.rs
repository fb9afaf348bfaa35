// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, info, instrument, trace, warn};

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "tracing"))]
pub(crate) use debug;

#[cfg(not(feature = "tracing"))]
macro_rules! info {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "tracing"))]
pub(crate) use info;

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "tracing"))]
pub(crate) use trace;

// `warn` clashes with the builtin lint attribute, so it is defined under
// another name and renamed on export.
#[cfg(not(feature = "tracing"))]
macro_rules! warn_ {
    ($($arg:tt)*) => {};
}
#[cfg(not(feature = "tracing"))]
pub(crate) use warn_ as warn;
