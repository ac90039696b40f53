pub mod locale_negotiator;

pub use locale_negotiator::{
    LocaleNegotiator, Negotiation, RouteDecision, SubdomainLocale, SubdomainRouter,
    set_tld_length, tld_length,
};
