//! Region allow/deny evaluation.

use super::proxy::looks_like_proxy;
use crate::config::PolicyConfig;
use crate::error_handling::DecisionOutcome;
use crate::geoip::GeoVerdict;

/// Evaluates a verdict against the policy and reports why it ended where it did.
///
/// Checks run in order and the first match decides:
/// 1. service proxy flag: deny
/// 2. eligible region with a proxy keyword in ISP or org: deny
/// 3. restriction enabled and the country code in the denied list: deny
/// 4. otherwise allow only an eligible region
///
/// The denied list can only narrow the eligible set {CN, HK, MO, TW}; a code
/// outside that set is denied whatever the list contains.
pub fn assess(verdict: &GeoVerdict, config: &PolicyConfig) -> DecisionOutcome {
    if verdict.is_proxy_flagged {
        return DecisionOutcome::DeniedProxyFlagged;
    }

    if !verdict.is_china_region {
        return DecisionOutcome::DeniedOutsideRegion;
    }

    if looks_like_proxy(&verdict.isp, &verdict.org) {
        return DecisionOutcome::DeniedProxyKeyword;
    }

    if config.region_restriction_enabled() && config.is_region_denied(&verdict.country_code) {
        return DecisionOutcome::DeniedRestrictedRegion;
    }

    DecisionOutcome::Allowed
}

/// `true` when the verdict is admitted under `config`.
pub fn evaluate(verdict: &GeoVerdict, config: &PolicyConfig) -> bool {
    assess(verdict, config).is_allowed()
}
