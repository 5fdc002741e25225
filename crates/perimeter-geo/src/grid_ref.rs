//! Alphanumeric grid references (MGRS layout over WGS-84 UTM).
//!
//! A reference reads `<zone><band><square><easting digits><northing digits>`,
//! e.g. `47PQR3886571630`. Precision is the digit count per axis (0-5); each
//! extra digit narrows the square by a factor of ten. Latitudes outside
//! [-80, 84] (the polar caps) are not gridded.

use perimeter_core::constants::MAX_GRID_PRECISION;
use perimeter_core::constants::UNKNOWN_GRID_REFERENCE;
use perimeter_core::error::GridRefError;
use perimeter_core::types::{normalize_longitude, GeoPoint};

/// WGS-84 semi-major axis in meters.
const WGS84_A: f64 = 6_378_137.0;
/// WGS-84 first eccentricity squared.
const ECC_SQUARED: f64 = 0.006_694_38;
/// UTM central meridian scale factor.
const K0: f64 = 0.9996;
/// False easting applied to every zone.
const FALSE_EASTING: f64 = 500_000.0;
/// False northing applied south of the equator.
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Side of one lettered square in meters.
const SQUARE_SIZE: f64 = 100_000.0;

/// Latitude bands of 8 degrees from -80 to 72; X covers 72 to 84.
const BANDS: &[u8; 19] = b"CDEFGHJKLMNPQRSTUVW";

/// Column letter origin for each of the six square-lettering sets.
const SET_ORIGIN_COLUMN_LETTERS: &[u8; 6] = b"AJSAJS";
/// Row letter origin for each of the six square-lettering sets.
const SET_ORIGIN_ROW_LETTERS: &[u8; 6] = b"AFAFAF";

const LETTER_A: u32 = b'A' as u32;
const LETTER_I: u32 = b'I' as u32;
const LETTER_O: u32 = b'O' as u32;
const LETTER_V: u32 = b'V' as u32;
const LETTER_Z: u32 = b'Z' as u32;

/// Projected UTM coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Utm {
    pub easting: f64,
    pub northing: f64,
    pub zone: u32,
    pub band: char,
}

/// Encode a point at `precision` digits per axis.
pub fn encode(point: GeoPoint, precision: u8) -> Result<String, GridRefError> {
    if precision > MAX_GRID_PRECISION {
        return Err(GridRefError::PrecisionTooHigh(precision));
    }
    let utm = to_utm(point)?;
    let easting = utm.easting.trunc() as i64;
    let northing = utm.northing.trunc() as i64;

    let set = square_set(utm.zone);
    let column = (easting / 100_000) as u32;
    let row = ((northing / 100_000) % 20) as u32;
    let square = square_letters(column, row, set);

    let p = precision as usize;
    let east_digits = format!("{:05}", easting.rem_euclid(100_000));
    let north_digits = format!("{:05}", northing.rem_euclid(100_000));
    Ok(format!(
        "{}{}{}{}{}",
        utm.zone,
        utm.band,
        square,
        &east_digits[..p],
        &north_digits[..p]
    ))
}

/// Encode a point, yielding `None` when it cannot be gridded.
pub fn grid_reference(point: GeoPoint, precision: u8) -> Option<String> {
    encode(point, precision).ok()
}

/// Encode a point for display, falling back to the unknown placeholder.
pub fn grid_reference_or_unknown(point: GeoPoint, precision: u8) -> String {
    grid_reference(point, precision).unwrap_or_else(|| UNKNOWN_GRID_REFERENCE.to_string())
}

/// Decode already-split parts: zone number, band letter, square letters and
/// an even-length digit string.
pub fn decode_parts(
    zone: u32,
    band: char,
    square: [char; 2],
    digits: &str,
) -> Result<GeoPoint, GridRefError> {
    if !(1..=60).contains(&zone) {
        return Err(GridRefError::InvalidZone(zone));
    }
    let band = band.to_ascii_uppercase();
    let min_northing = min_northing_for_band(band).ok_or(GridRefError::InvalidBand(band))?;
    if digits.len() % 2 != 0
        || digits.len() > 2 * MAX_GRID_PRECISION as usize
        || !digits.chars().all(|c| c.is_ascii_digit())
    {
        return Err(GridRefError::Malformed(digits.to_string()));
    }

    let set = square_set(zone);
    let east_100k = easting_from_letter(square[0].to_ascii_uppercase(), set)?;
    let mut north_100k = northing_from_letter(square[1].to_ascii_uppercase(), set)?;
    while north_100k < min_northing {
        north_100k += 2_000_000.0;
    }

    let half = digits.len() / 2;
    let cell = SQUARE_SIZE / 10f64.powi(half as i32);
    let (east_offset, north_offset) = if half == 0 {
        (0.0, 0.0)
    } else {
        let e: f64 = digits[..half]
            .parse()
            .map_err(|_| GridRefError::Malformed(digits.to_string()))?;
        let n: f64 = digits[half..]
            .parse()
            .map_err(|_| GridRefError::Malformed(digits.to_string()))?;
        (e * cell, n * cell)
    };

    let utm = Utm {
        easting: east_100k + east_offset + cell / 2.0,
        northing: north_100k + north_offset + cell / 2.0,
        zone,
        band,
    };
    Ok(from_utm(&utm))
}

/// Project a point to UTM, honoring the Norway and Svalbard zone exceptions.
pub fn to_utm(point: GeoPoint) -> Result<Utm, GridRefError> {
    if !point.lat.is_finite() || !point.lon.is_finite() {
        return Err(GridRefError::NonFinite);
    }
    let lat = point.lat;
    let lon = normalize_longitude(point.lon);
    let band = band_letter(lat).ok_or(GridRefError::LatitudeOutOfRange(lat))?;
    let zone = zone_number(lat, lon);

    let lon_origin = ((zone as f64) - 1.0) * 6.0 - 180.0 + 3.0;
    let lat_rad = lat.to_radians();
    let lon_rad = lon.to_radians();
    let lon_origin_rad = lon_origin.to_radians();
    let ecc_prime_squared = ECC_SQUARED / (1.0 - ECC_SQUARED);
    let e2 = ECC_SQUARED * ECC_SQUARED;
    let e3 = e2 * ECC_SQUARED;

    let n = WGS84_A / (1.0 - ECC_SQUARED * lat_rad.sin().powi(2)).sqrt();
    let t = lat_rad.tan().powi(2);
    let c = ecc_prime_squared * lat_rad.cos().powi(2);
    let a = lat_rad.cos() * (lon_rad - lon_origin_rad);
    let m = WGS84_A
        * ((1.0 - ECC_SQUARED / 4.0 - 3.0 * e2 / 64.0 - 5.0 * e3 / 256.0) * lat_rad
            - (3.0 * ECC_SQUARED / 8.0 + 3.0 * e2 / 32.0 + 45.0 * e3 / 1024.0)
                * (2.0 * lat_rad).sin()
            + (15.0 * e2 / 256.0 + 45.0 * e3 / 1024.0) * (4.0 * lat_rad).sin()
            - (35.0 * e3 / 3072.0) * (6.0 * lat_rad).sin());

    let easting = K0
        * n
        * (a + (1.0 - t + c) * a.powi(3) / 6.0
            + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ecc_prime_squared) * a.powi(5)
                / 120.0)
        + FALSE_EASTING;
    let mut northing = K0
        * (m + n
            * lat_rad.tan()
            * (a * a / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ecc_prime_squared)
                    * a.powi(6)
                    / 720.0));
    if lat < 0.0 {
        northing += FALSE_NORTHING_SOUTH;
    }

    Ok(Utm {
        easting,
        northing,
        zone,
        band,
    })
}

/// Inverse UTM projection.
pub fn from_utm(utm: &Utm) -> GeoPoint {
    let e1 = (1.0 - (1.0 - ECC_SQUARED).sqrt()) / (1.0 + (1.0 - ECC_SQUARED).sqrt());
    let x = utm.easting - FALSE_EASTING;
    let mut y = utm.northing;
    if utm.band < 'N' {
        y -= FALSE_NORTHING_SOUTH;
    }

    let lon_origin = ((utm.zone as f64) - 1.0) * 6.0 - 180.0 + 3.0;
    let ecc_prime_squared = ECC_SQUARED / (1.0 - ECC_SQUARED);
    let e2 = ECC_SQUARED * ECC_SQUARED;
    let e3 = e2 * ECC_SQUARED;

    let m = y / K0;
    let mu = m / (WGS84_A * (1.0 - ECC_SQUARED / 4.0 - 3.0 * e2 / 64.0 - 5.0 * e3 / 256.0));
    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin();

    let sin_phi = phi1.sin();
    let n1 = WGS84_A / (1.0 - ECC_SQUARED * sin_phi * sin_phi).sqrt();
    let t1 = phi1.tan().powi(2);
    let c1 = ecc_prime_squared * phi1.cos().powi(2);
    let r1 = WGS84_A * (1.0 - ECC_SQUARED) / (1.0 - ECC_SQUARED * sin_phi * sin_phi).powf(1.5);
    let d = x / (n1 * K0);

    let lat = phi1
        - (n1 * phi1.tan() / r1)
            * (d * d / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ecc_prime_squared)
                    * d.powi(4)
                    / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1
                    - 252.0 * ecc_prime_squared
                    - 3.0 * c1 * c1)
                    * d.powi(6)
                    / 720.0);
    let lon = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
        + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ecc_prime_squared + 24.0 * t1 * t1)
            * d.powi(5)
            / 120.0)
        / phi1.cos();

    GeoPoint::new(lat.to_degrees(), lon_origin + lon.to_degrees())
}

fn band_letter(lat: f64) -> Option<char> {
    if (72.0..=84.0).contains(&lat) {
        return Some('X');
    }
    if !(-80.0..72.0).contains(&lat) {
        return None;
    }
    let index = ((lat + 80.0) / 8.0).floor() as usize;
    BANDS.get(index).map(|&b| b as char)
}

fn zone_number(lat: f64, lon: f64) -> u32 {
    if lon >= 180.0 {
        return 60;
    }
    if (56.0..64.0).contains(&lat) && (3.0..12.0).contains(&lon) {
        return 32;
    }
    if (72.0..84.0).contains(&lat) {
        if (0.0..9.0).contains(&lon) {
            return 31;
        } else if (9.0..21.0).contains(&lon) {
            return 33;
        } else if (21.0..33.0).contains(&lon) {
            return 35;
        } else if (33.0..42.0).contains(&lon) {
            return 37;
        }
    }
    (((lon + 180.0) / 6.0).floor() as u32 + 1).min(60)
}

/// Square-lettering set (1-6) used by a zone.
fn square_set(zone: u32) -> usize {
    match (zone % 6) as usize {
        0 => 6,
        set => set,
    }
}

/// Two-letter square id for a 100 km column/row within a lettering set.
fn square_letters(column: u32, row: u32, set: usize) -> String {
    let col_origin = SET_ORIGIN_COLUMN_LETTERS[set - 1] as u32;
    let row_origin = SET_ORIGIN_ROW_LETTERS[set - 1] as u32;

    let mut col = (col_origin + column).saturating_sub(1).max(LETTER_A);
    let mut row_letter = row_origin + row;
    let mut rollover = false;

    if col > LETTER_Z {
        col = col - LETTER_Z + LETTER_A - 1;
        rollover = true;
    }
    if col == LETTER_I
        || (col_origin < LETTER_I && col > LETTER_I)
        || ((col > LETTER_I || col_origin < LETTER_I) && rollover)
    {
        col += 1;
    }
    if col == LETTER_O
        || (col_origin < LETTER_O && col > LETTER_O)
        || ((col > LETTER_O || col_origin < LETTER_O) && rollover)
    {
        col += 1;
        if col == LETTER_I {
            col += 1;
        }
    }
    if col > LETTER_Z {
        col = col - LETTER_Z + LETTER_A - 1;
    }

    if row_letter > LETTER_V {
        row_letter = row_letter - LETTER_V + LETTER_A - 1;
        rollover = true;
    } else {
        rollover = false;
    }
    if row_letter == LETTER_I
        || (row_origin < LETTER_I && row_letter > LETTER_I)
        || ((row_letter > LETTER_I || row_origin < LETTER_I) && rollover)
    {
        row_letter += 1;
    }
    if row_letter == LETTER_O
        || (row_origin < LETTER_O && row_letter > LETTER_O)
        || ((row_letter > LETTER_O || row_origin < LETTER_O) && rollover)
    {
        row_letter += 1;
        if row_letter == LETTER_I {
            row_letter += 1;
        }
    }
    if row_letter > LETTER_V {
        row_letter = row_letter - LETTER_V + LETTER_A - 1;
    }

    let to_char = |code: u32| char::from_u32(code).unwrap_or('?');
    format!("{}{}", to_char(col), to_char(row_letter))
}

/// Easting of the west edge of the square whose column letter is `letter`.
fn easting_from_letter(letter: char, set: usize) -> Result<f64, GridRefError> {
    let target = letter as u32;
    if !(LETTER_A..=LETTER_Z).contains(&target) || target == LETTER_I || target == LETTER_O {
        return Err(GridRefError::InvalidSquare(letter));
    }
    let mut current = SET_ORIGIN_COLUMN_LETTERS[set - 1] as u32;
    let mut easting = SQUARE_SIZE;
    let mut rewound = false;

    while current != target {
        current += 1;
        if current == LETTER_I {
            current += 1;
        }
        if current == LETTER_O {
            current += 1;
        }
        if current > LETTER_Z {
            if rewound {
                return Err(GridRefError::InvalidSquare(letter));
            }
            current = LETTER_A;
            rewound = true;
        }
        easting += SQUARE_SIZE;
    }
    Ok(easting)
}

/// Northing (modulo 2000 km) of the south edge of the square whose row
/// letter is `letter`.
fn northing_from_letter(letter: char, set: usize) -> Result<f64, GridRefError> {
    let target = letter as u32;
    if !(LETTER_A..=LETTER_V).contains(&target) || target == LETTER_I || target == LETTER_O {
        return Err(GridRefError::InvalidSquare(letter));
    }
    let mut current = SET_ORIGIN_ROW_LETTERS[set - 1] as u32;
    let mut northing = 0.0;
    let mut rewound = false;

    while current != target {
        current += 1;
        if current == LETTER_I {
            current += 1;
        }
        if current == LETTER_O {
            current += 1;
        }
        if current > LETTER_V {
            if rewound {
                return Err(GridRefError::InvalidSquare(letter));
            }
            current = LETTER_A;
            rewound = true;
        }
        northing += SQUARE_SIZE;
    }
    Ok(northing)
}

/// Lowest northing a band can hold, in meters.
fn min_northing_for_band(band: char) -> Option<f64> {
    let value = match band {
        'C' => 1_100_000.0,
        'D' => 2_000_000.0,
        'E' => 2_800_000.0,
        'F' => 3_700_000.0,
        'G' => 4_600_000.0,
        'H' => 5_500_000.0,
        'J' => 6_400_000.0,
        'K' => 7_300_000.0,
        'L' => 8_200_000.0,
        'M' => 9_100_000.0,
        'N' => 0.0,
        'P' => 800_000.0,
        'Q' => 1_700_000.0,
        'R' => 2_600_000.0,
        'S' => 3_500_000.0,
        'T' => 4_400_000.0,
        'U' => 5_300_000.0,
        'V' => 6_200_000.0,
        'W' => 7_000_000.0,
        'X' => 7_900_000.0,
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::haversine_distance;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_known_references() {
        let cases = [
            (GeoPoint::new(36.236123461597515, -115.08209766323476), "11SPA7234911844"),
            (GeoPoint::new(38.8895, -77.0352), "18SUJ2348606483"),
            (GeoPoint::new(14.2059, 101.2134), "47PQR3886571630"),
            (GeoPoint::new(-33.8688, 151.2093), "56HLH3436850948"),
        ];
        for (point, expected) in cases {
            assert_eq!(encode(point, 5).unwrap(), expected);
        }
    }

    #[test]
    fn test_precision_truncates_digits() {
        let p = GeoPoint::new(48.24949, 16.41450);
        assert_eq!(encode(p, 1).unwrap(), "33UXP04");
        assert_eq!(encode(p, 0).unwrap(), "33UXP");
        let mut previous = encode(p, 0).unwrap();
        for precision in 1..=5 {
            let current = encode(p, precision).unwrap();
            assert_eq!(current.len(), previous.len() + 2);
            previous = current;
        }
    }

    #[test]
    fn test_zone_exceptions() {
        // Southwest Norway is widened into zone 32.
        assert_eq!(encode(GeoPoint::new(60.0, 5.0), 5).unwrap(), "32VKM7697958157");
        // Svalbard uses the odd zones only.
        assert_eq!(encode(GeoPoint::new(78.0, 15.0), 5).unwrap(), "33XWG0000058369");
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let p = GeoPoint::new(14.2132, 101.2188);
        assert_eq!(encode(p, 4).unwrap(), encode(p, 4).unwrap());
    }

    #[test]
    fn test_out_of_range_is_unknown() {
        assert!(grid_reference(GeoPoint::new(85.0, 10.0), 5).is_none());
        assert!(grid_reference(GeoPoint::new(-81.0, 10.0), 5).is_none());
        assert!(grid_reference(GeoPoint::new(f64::NAN, 10.0), 5).is_none());
        assert_eq!(
            grid_reference_or_unknown(GeoPoint::new(89.0, 0.0), 5),
            UNKNOWN_GRID_REFERENCE
        );
        assert_eq!(
            encode(GeoPoint::new(10.0, 10.0), 6),
            Err(GridRefError::PrecisionTooHigh(6))
        );
    }

    /// Split an unspaced reference produced by `encode`.
    fn parts(reference: &str) -> (u32, char, [char; 2], &str) {
        let zone_len = reference.chars().take_while(|c| c.is_ascii_digit()).count();
        let mut letters = reference[zone_len..].chars();
        let band = letters.next().unwrap();
        let square = [letters.next().unwrap(), letters.next().unwrap()];
        (
            reference[..zone_len].parse().unwrap(),
            band,
            square,
            &reference[zone_len + 3..],
        )
    }

    #[test]
    fn test_decode_lands_inside_named_square() {
        let p = decode_parts(47, 'P', ['Q', 'R'], "3886571630").unwrap();
        let original = GeoPoint::new(14.2059, 101.2134);
        assert!(haversine_distance(p, original) < 1.5);

        let lower = decode_parts(47, 'p', ['q', 'r'], "3886571630").unwrap();
        assert!(haversine_distance(p, lower) < 1e-6);
    }

    #[test]
    fn test_decode_then_encode_recovers_reference() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..2000 {
            let point = GeoPoint::new(rng.gen_range(-79.5..83.5), rng.gen_range(-179.9..179.9));
            let reference = encode(point, 5).unwrap();
            let (zone, band, square, digits) = parts(&reference);
            let decoded = decode_parts(zone, band, square, digits).unwrap();
            assert!(
                haversine_distance(point, decoded) < 1.5,
                "{reference}: {point:?} vs {decoded:?}"
            );
        }
    }

    #[test]
    fn test_decode_rejects_bad_parts() {
        assert!(matches!(
            decode_parts(61, 'P', ['Q', 'R'], "1234"),
            Err(GridRefError::InvalidZone(61))
        ));
        assert!(matches!(
            decode_parts(47, 'I', ['Q', 'R'], "1234"),
            Err(GridRefError::InvalidBand('I'))
        ));
        assert!(matches!(
            decode_parts(47, 'P', ['Q', 'W'], "1234"),
            Err(GridRefError::InvalidSquare('W'))
        ));
        assert!(matches!(
            decode_parts(47, 'P', ['Q', 'R'], "123"),
            Err(GridRefError::Malformed(_))
        ));
        assert!(matches!(
            decode_parts(47, 'P', ['Q', 'R'], "12a4"),
            Err(GridRefError::Malformed(_))
        ));
    }
}
