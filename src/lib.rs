#![doc(html_logo_url = "https://raw.githubusercontent.com/rtk-rs/.github/master/logos/logo2.jpg")]
#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

/*
 * PVT-MONITOR is part of the rtk-rs framework.
 * Authors: Guillaume W. Bres <guillaume.bressaix@gmail.com> et al,
 * (cf. https://github.com/rtk-rs/pvt-monitor/graphs/contributors)
 * This framework is shipped under Mozilla Public V2 license.
 *
 * Documentation: https://github.com/rtk-rs/pvt-monitor
 */

pub mod archive;
pub mod cli;
pub mod monitor;
pub mod pvt;

pub mod prelude {
    pub use crate::archive::{decode, encode, DecodeError};
    pub use crate::monitor::{
        dashboard::{Dashboard, TerminalSession},
        json::JsonLines,
        settings::{Output, Settings},
        Error, Monitor, Renderer,
    };
    pub use crate::pvt::PvtRecord;
}
