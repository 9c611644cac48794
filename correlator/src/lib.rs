// hlsrc — HLS Report Correlator
//
// Library root. Documents are parsed once (`document`), then every selection
// runs a full cycle: canonical names (`names`) → block index (`index`) →
// subtree rows (`flatten`, `latency`) → panel (`panel`) → rendering
// (`render`). `session` strings the cycle together.

pub mod diag;
pub mod document;
pub mod flatten;
pub mod index;
pub mod latency;
pub mod names;
pub mod outline;
pub mod panel;
pub mod provenance;
pub mod render;
pub mod session;
