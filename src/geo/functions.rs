// 3rd party crates
use tracing::{debug, error};

// Project imports
use crate::directory::types::{IpInfo, IpInfoField, ReturnCode};

// Current module imports
use super::constants::GEO_INFO_SOURCE;
use super::types::{ErrorClass, GeoLookupResult, Locality};

/// Decides whether a failed query left the directory link usable.
///
/// Invalid input, timeouts and pool exhaustion are transient. Codes that only
/// make sense on a successful record, and codes this client does not know,
/// are `Unknown`; anything else means the link is broken.
pub fn classify_return_code(code: &ReturnCode) -> ErrorClass {
    match code {
        ReturnCode::InvalidInput | ReturnCode::Timeout | ReturnCode::PoolFailure => {
            ErrorClass::Recoverable
        }
        ReturnCode::InvalidLicense | ReturnCode::ServerUnavailable | ReturnCode::InternalError => {
            ErrorClass::Fatal
        }
        ReturnCode::Success | ReturnCode::NotFound | ReturnCode::Other(_) => ErrorClass::Unknown,
    }
}

/// Whether a record's own return code allows mapping it into a result.
pub fn is_usable_record(code: &ReturnCode) -> bool {
    matches!(code, ReturnCode::Success | ReturnCode::NotFound)
}

/// Converts a directory record into a normalized result.
///
/// Field-level parse failures only leave the affected field unset.
pub fn map_record(
    record: &IpInfo,
    queried_address: &str,
    city_confidence_threshold: i32,
) -> GeoLookupResult {
    let source_address = record
        .get_string(IpInfoField::IpAddress)
        .unwrap_or(queried_address);
    let mut result = GeoLookupResult::new(source_address, GEO_INFO_SOURCE);

    result.country_code = record
        .get_string(IpInfoField::Country)
        .map(str::to_uppercase);

    match record.get_float(IpInfoField::Timezone) {
        Ok(gmt_offset) => result.gmt_offset = gmt_offset,
        // Addresses spanning several zones come back as a non-numeric marker.
        Err(e) => debug!(address = %result.source_address, "Timezone not numeric: {}", e),
    }

    match record.get_int(IpInfoField::Dma) {
        Ok(Some(market_code)) => result.market_code = market_code,
        Ok(None) => {}
        Err(e) => error!(
            address = %result.source_address,
            "Could not parse market code: {}",
            e
        ),
    }

    result.locality = confident_locality(record, city_confidence_threshold);

    match record.get_float(IpInfoField::Latitude) {
        Ok(latitude) => result.latitude = latitude,
        Err(e) => error!(address = %result.source_address, "Could not parse latitude: {}", e),
    }

    match record.get_float(IpInfoField::Longitude) {
        Ok(longitude) => result.longitude = longitude,
        Err(e) => error!(address = %result.source_address, "Could not parse longitude: {}", e),
    }

    result
}

/// Zip, city and state, if the city confidence reaches the threshold and all three are present.
fn confident_locality(record: &IpInfo, threshold: i32) -> Option<Locality> {
    let confidence = record.get_cf(IpInfoField::City)?;
    if confidence < threshold {
        debug!(
            confidence,
            threshold, "City confidence below threshold, suppressing locality"
        );
        return None;
    }

    match (
        record.get_string(IpInfoField::Zip),
        record.get_string(IpInfoField::City),
        record.get_string(IpInfoField::State),
    ) {
        (Some(zip), Some(city), Some(state)) => Some(Locality {
            zip_code: zip.to_string(),
            city_name: city.to_string(),
            state_name: state.to_string(),
        }),
        _ => {
            debug!("Incomplete locality in a confident record, suppressing it");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn montgomery() -> IpInfo {
        IpInfo::new(ReturnCode::Success)
            .with_field(IpInfoField::IpAddress, "68.184.77.220")
            .with_field(IpInfoField::Country, "us")
            .with_field(IpInfoField::State, "al")
            .with_field(IpInfoField::City, "montgomery")
            .with_field(IpInfoField::Zip, "36107")
            .with_field(IpInfoField::Timezone, "-6.0")
            .with_field(IpInfoField::Dma, "698")
            .with_field(IpInfoField::Latitude, "32.38316")
            .with_field(IpInfoField::Longitude, "-86.28197")
            .with_confidence(IpInfoField::City, 80)
    }

    #[test]
    fn transient_codes_are_recoverable() {
        for code in [
            ReturnCode::InvalidInput,
            ReturnCode::Timeout,
            ReturnCode::PoolFailure,
        ] {
            assert_eq!(classify_return_code(&code), ErrorClass::Recoverable, "{}", code);
        }
    }

    #[test]
    fn link_failures_are_fatal() {
        for code in [
            ReturnCode::InvalidLicense,
            ReturnCode::ServerUnavailable,
            ReturnCode::InternalError,
        ] {
            assert_eq!(classify_return_code(&code), ErrorClass::Fatal, "{}", code);
        }
    }

    #[test]
    fn success_codes_and_strangers_are_unknown() {
        for code in [
            ReturnCode::Success,
            ReturnCode::NotFound,
            ReturnCode::Other("LICENSE_EXPIRED".into()),
        ] {
            assert_eq!(classify_return_code(&code), ErrorClass::Unknown, "{}", code);
        }
    }

    #[test]
    fn only_success_and_not_found_records_are_usable() {
        assert!(is_usable_record(&ReturnCode::Success));
        assert!(is_usable_record(&ReturnCode::NotFound));
        assert!(!is_usable_record(&ReturnCode::InternalError));
        assert!(!is_usable_record(&ReturnCode::Other("PARTIAL".into())));
    }

    #[test]
    fn maps_a_complete_record() {
        let result = map_record(&montgomery(), "68.184.77.220", 0);

        assert_eq!(result.source_address(), "68.184.77.220");
        assert_eq!(result.info_source(), 'Q');
        assert_eq!(result.country_code(), Some("US"));
        assert_eq!(result.gmt_offset(), Some(-6.0));
        assert_eq!(result.market_code(), 698);
        assert_eq!(result.city_name(), Some("montgomery"));
        assert_eq!(result.state_name(), Some("al"));
        assert_eq!(result.zip_code(), Some("36107"));
        assert_eq!(result.latitude(), Some(32.38316));
        assert_eq!(result.longitude(), Some(-86.28197));
    }

    #[test]
    fn low_confidence_suppresses_the_whole_locality() {
        let result = map_record(&montgomery(), "68.184.77.220", 81);

        assert_eq!(result.locality(), None);
        assert_eq!(result.zip_code(), None);
        assert_eq!(result.country_code(), Some("US"));
    }

    #[test]
    fn threshold_is_inclusive() {
        assert!(map_record(&montgomery(), "68.184.77.220", 80).locality().is_some());
    }

    #[test]
    fn missing_confidence_suppresses_the_locality() {
        let mut record = montgomery();
        record.confidence.clear();

        assert_eq!(map_record(&record, "68.184.77.220", 0).locality(), None);
    }

    #[test]
    fn partial_locality_is_never_exposed() {
        let mut record = montgomery();
        record.fields.remove(IpInfoField::Zip.as_str());

        let result = map_record(&record, "68.184.77.220", 0);

        assert_eq!(result.city_name(), None);
        assert_eq!(result.state_name(), None);
        assert_eq!(result.zip_code(), None);
    }

    #[test]
    fn field_parse_failures_only_affect_their_field() {
        let record = montgomery()
            .with_field(IpInfoField::Timezone, "multizone")
            .with_field(IpInfoField::Dma, "n/a")
            .with_field(IpInfoField::Latitude, "north");

        let result = map_record(&record, "68.184.77.220", 0);

        assert_eq!(result.gmt_offset(), None);
        assert_eq!(result.market_code(), 0);
        assert_eq!(result.latitude(), None);
        assert_eq!(result.longitude(), Some(-86.28197));
        assert_eq!(result.city_name(), Some("montgomery"));
    }

    #[test]
    fn empty_record_falls_back_to_queried_address() {
        let result = map_record(&IpInfo::new(ReturnCode::NotFound), "172.17.29.112", 0);

        assert_eq!(result.source_address(), "172.17.29.112");
        assert_eq!(result.country_code(), None);
        assert_eq!(result.locality(), None);
        assert_eq!(result.gmt_offset(), None);
    }
}
