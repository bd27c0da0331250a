use hifitime::prelude::{Epoch, TimeScale};

use nom::{
    number::complete::{le_f32, le_f64, le_u32, le_u8},
    IResult,
};

use serde::Serialize;

/// Number of fields (and screen rows) of a [PvtRecord]
pub const NUM_FIELDS: usize = 28;

/// Field labels, in wire order, as the receiver names them
pub const LABELS: [&str; NUM_FIELDS] = [
    "TOW_at_current_symbol_ms:",
    "week:",
    "RX_time:",
    "user_clk_offset:",
    "pos_x:",
    "pos_y:",
    "pos_z:",
    "vel_x:",
    "vel_y:",
    "vel_z:",
    "cov_xx:",
    "cov_yy:",
    "cov_zz:",
    "cov_xy:",
    "cov_yz:",
    "cov_zx:",
    "latitude:",
    "longitude:",
    "height:",
    "valid_sats:",
    "solution_status:",
    "solution_type:",
    "AR_ratio_factor:",
    "AR_ratio_threshold:",
    "gdop:",
    "pdop:",
    "hdop:",
    "vdop:",
];

/// Fixed point, 6 decimals. NaN prints as `nan` / `-nan`.
fn fixed<T: std::fmt::Display + Into<f64> + Copy>(value: T) -> String {
    let widened: f64 = value.into();
    if widened.is_nan() {
        if widened.is_sign_negative() {
            "-nan".to_string()
        } else {
            "nan".to_string()
        }
    } else {
        format!("{:.6}", value)
    }
}

/// Navigation solution (Position, Velocity, Time) published by the receiver.
/// Fields are declared in wire order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct PvtRecord {
    /// Time of week [ms]
    pub tow_at_current_symbol_ms: u32,
    /// GNSS week number
    pub week: u32,
    /// Receiver time [s]
    pub rx_time: f64,
    /// User clock offset [s]
    pub user_clk_offset: f64,

    /// ECEF position [m]
    pub pos_x: f64,
    pub pos_y: f64,
    pub pos_z: f64,

    /// ECEF velocity [m/s]
    pub vel_x: f64,
    pub vel_y: f64,
    pub vel_z: f64,

    /// Position (co)variance [m^2]
    pub cov_xx: f64,
    pub cov_yy: f64,
    pub cov_zz: f64,
    pub cov_xy: f64,
    pub cov_yz: f64,
    pub cov_zx: f64,

    /// Latitude [deg]
    pub latitude: f64,
    /// Longitude [deg]
    pub longitude: f64,
    /// Height [m]
    pub height: f64,

    /// Number of satellites used in the solution
    pub valid_sats: u8,
    /// Solution status code
    pub solution_status: u8,
    /// Solution type (0: ECEF, 1: ENU baseline)
    pub solution_type: u8,

    /// Ambiguity resolution ratio factor
    pub ar_ratio_factor: f32,
    /// Ambiguity resolution ratio threshold
    pub ar_ratio_threshold: f32,

    pub gdop: f64,
    pub pdop: f64,
    pub hdop: f64,
    pub vdop: f64,
}

impl PvtRecord {
    /// Size of the encoded fields, in bytes
    pub const ENCODED_SIZE: usize = 2 * 4 + 17 * 8 + 3 + 2 * 4 + 4 * 8;

    /// [Epoch] (in GPST) this solution was resolved at
    pub fn epoch(&self) -> Epoch {
        let nanos = u64::from(self.tow_at_current_symbol_ms) * 1_000_000;
        Epoch::from_time_of_week(self.week, nanos, TimeScale::GPST)
    }

    /// Returns all (label, value) pairs, in screen order.
    /// Integers are printed without decimals, floating point values
    /// with 6 decimals (single precision for the AR metrics).
    pub fn fields(&self) -> [(&'static str, String); NUM_FIELDS] {
        let mut values = [
            self.tow_at_current_symbol_ms.to_string(),
            self.week.to_string(),
            fixed(self.rx_time),
            fixed(self.user_clk_offset),
            fixed(self.pos_x),
            fixed(self.pos_y),
            fixed(self.pos_z),
            fixed(self.vel_x),
            fixed(self.vel_y),
            fixed(self.vel_z),
            fixed(self.cov_xx),
            fixed(self.cov_yy),
            fixed(self.cov_zz),
            fixed(self.cov_xy),
            fixed(self.cov_yz),
            fixed(self.cov_zx),
            fixed(self.latitude),
            fixed(self.longitude),
            fixed(self.height),
            self.valid_sats.to_string(),
            self.solution_status.to_string(),
            self.solution_type.to_string(),
            fixed(self.ar_ratio_factor),
            fixed(self.ar_ratio_threshold),
            fixed(self.gdop),
            fixed(self.pdop),
            fixed(self.hdop),
            fixed(self.vdop),
        ];

        std::array::from_fn(|row| (LABELS[row], std::mem::take(&mut values[row])))
    }

    /// Parses the record fields (little-endian, native widths)
    pub fn parse(input: &[u8]) -> IResult<&[u8], Self> {
        let (input, tow_at_current_symbol_ms) = le_u32(input)?;
        let (input, week) = le_u32(input)?;
        let (input, rx_time) = le_f64(input)?;
        let (input, user_clk_offset) = le_f64(input)?;

        let (input, pos_x) = le_f64(input)?;
        let (input, pos_y) = le_f64(input)?;
        let (input, pos_z) = le_f64(input)?;
        let (input, vel_x) = le_f64(input)?;
        let (input, vel_y) = le_f64(input)?;
        let (input, vel_z) = le_f64(input)?;

        let (input, cov_xx) = le_f64(input)?;
        let (input, cov_yy) = le_f64(input)?;
        let (input, cov_zz) = le_f64(input)?;
        let (input, cov_xy) = le_f64(input)?;
        let (input, cov_yz) = le_f64(input)?;
        let (input, cov_zx) = le_f64(input)?;

        let (input, latitude) = le_f64(input)?;
        let (input, longitude) = le_f64(input)?;
        let (input, height) = le_f64(input)?;

        let (input, valid_sats) = le_u8(input)?;
        let (input, solution_status) = le_u8(input)?;
        let (input, solution_type) = le_u8(input)?;
        let (input, ar_ratio_factor) = le_f32(input)?;
        let (input, ar_ratio_threshold) = le_f32(input)?;

        let (input, gdop) = le_f64(input)?;
        let (input, pdop) = le_f64(input)?;
        let (input, hdop) = le_f64(input)?;
        let (input, vdop) = le_f64(input)?;

        Ok((
            input,
            Self {
                tow_at_current_symbol_ms,
                week,
                rx_time,
                user_clk_offset,
                pos_x,
                pos_y,
                pos_z,
                vel_x,
                vel_y,
                vel_z,
                cov_xx,
                cov_yy,
                cov_zz,
                cov_xy,
                cov_yz,
                cov_zx,
                latitude,
                longitude,
                height,
                valid_sats,
                solution_status,
                solution_type,
                ar_ratio_factor,
                ar_ratio_threshold,
                gdop,
                pdop,
                hdop,
                vdop,
            },
        ))
    }

    /// Appends the encoded fields to `buf`
    pub fn extend_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.tow_at_current_symbol_ms.to_le_bytes());
        buf.extend_from_slice(&self.week.to_le_bytes());

        for value in [
            self.rx_time,
            self.user_clk_offset,
            self.pos_x,
            self.pos_y,
            self.pos_z,
            self.vel_x,
            self.vel_y,
            self.vel_z,
            self.cov_xx,
            self.cov_yy,
            self.cov_zz,
            self.cov_xy,
            self.cov_yz,
            self.cov_zx,
            self.latitude,
            self.longitude,
            self.height,
        ] {
            buf.extend_from_slice(&value.to_le_bytes());
        }

        buf.push(self.valid_sats);
        buf.push(self.solution_status);
        buf.push(self.solution_type);
        buf.extend_from_slice(&self.ar_ratio_factor.to_le_bytes());
        buf.extend_from_slice(&self.ar_ratio_threshold.to_le_bytes());

        for value in [self.gdop, self.pdop, self.hdop, self.vdop] {
            buf.extend_from_slice(&value.to_le_bytes());
        }
    }
}

impl std::fmt::Display for PvtRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - pvt: x={:.3} y={:.3} z={:.3} sats={} status={} type={}",
            self.epoch(),
            self.pos_x,
            self.pos_y,
            self.pos_z,
            self.valid_sats,
            self.solution_status,
            self.solution_type,
        )
    }
}
