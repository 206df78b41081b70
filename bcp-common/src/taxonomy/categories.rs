//! Post, SubPost and Environment enums
//!
//! The enums are the global universe shared by every environment. Which
//! subset an environment exposes, and how SubPosts group into Posts, lives in
//! the registry.

use crate::error::Error;
use serde::{Deserialize, Serialize};

/// Declares a fieldless category enum together with its English display
/// names, its variant table, `Display` and `FromStr`.
///
/// `FromStr` accepts the variant name (case-insensitive, `-`/`_` ignored) so
/// that `"ordinary-waste"`, `"ordinary_waste"` and `"OrdinaryWaste"` all parse.
macro_rules! category_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Get human-readable display name
            pub fn display_name(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Get all variants in declaration order
            pub fn all_variants() -> &'static [$name] {
                &[$($name::$variant,)+]
            }

            /// Variant identifier as used in snapshots and configuration
            pub fn key(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant),)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.display_name())
            }
        }

        impl std::str::FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = normalize(s);
                $name::all_variants()
                    .iter()
                    .copied()
                    .find(|v| normalize(v.key()) == wanted)
                    .ok_or_else(|| Error::UnknownCategory(format!("{}: {}", stringify!($name), s)))
            }
        }
    };
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

category_enum! {
    /// Organizational context selecting which taxonomy applies
    pub enum Environment {
        BilanCarbone => "Bilan Carbone",
        Cut => "CUT (cinema)",
        Tilt => "TILT",
    }
}

category_enum! {
    /// Top-level accounting category
    pub enum Post {
        // Bilan Carbone
        Energy => "Energy",
        NonEnergyEmissions => "Non-energy emissions",
        InputGoods => "Input goods and materials",
        InputServices => "Input services",
        DirectWaste => "Direct waste",
        EndOfLife => "End of life",
        Freight => "Freight",
        Travel => "Travel",
        FixedAssets => "Fixed assets",
        UseAndDependency => "Use and dependency",

        // TILT only
        Food => "Food",

        // CUT
        Operations => "Operations",
        AudienceMobility => "Audience mobility",
        ToursAndPreviews => "Tours and previews",
        ScreensAndBooths => "Screens and booths",
        ConcessionsAndDrinks => "Concessions and drinks",
        Waste => "Waste",
        TicketingAndCommunication => "Ticketing and communication",
    }
}

category_enum! {
    /// Accounting sub-category an emission source is recorded against
    pub enum SubPost {
        // Energy
        FossilFuels => "Fossil fuels",
        OrganicFuels => "Organic fuels",
        HeatAndSteamNetworks => "Heat and steam networks",
        CoolingNetworks => "Cooling networks",
        Electricity => "Electricity",

        // Non-energy emissions
        Agriculture => "Agriculture",
        LandUseChange => "Land use change",
        RefrigerantLeaks => "Refrigerant leaks",
        IndustrialProcesses => "Industrial processes",
        OtherNonEnergyEmissions => "Other non-energy emissions",

        // Input goods
        MetalsPlasticsAndGlass => "Metals, plastics and glass",
        PaperAndCardboard => "Paper and cardboard",
        ConstructionMaterials => "Construction materials",
        ChemicalsAndHydrogen => "Chemicals and hydrogen",
        FoodMealsAndDrinks => "Food, meals and drinks",
        RawMaterials => "Raw materials",
        OtherInputs => "Other inputs",

        // Input services
        PurchasedServices => "Purchased services",
        DigitalUsage => "Digital usage",

        // Direct waste
        PackagingWaste => "Packaging waste",
        OrganicWaste => "Organic waste",
        HouseholdWaste => "Household waste",
        HazardousWaste => "Hazardous waste",
        BuildingWaste => "Building waste",
        WasteWater => "Waste water",
        OtherWaste => "Other waste",

        // End of life
        EndOfLifePackaging => "End of life of packaging",
        EndOfLifeProducts => "End of life of sold products",

        // Freight
        InboundFreight => "Inbound freight",
        InternalFreight => "Internal freight",
        OutboundFreight => "Outbound freight",

        // Travel
        CommuteTravel => "Commute travel",
        BusinessTravel => "Business travel",
        VisitorTravel => "Visitor travel",

        // Fixed assets
        Buildings => "Buildings",
        OtherInfrastructure => "Other infrastructure",
        Equipment => "Equipment",
        ItEquipment => "IT equipment",

        // Use and dependency
        UseUnderResponsibility => "Use under responsibility",
        UseUnderDependency => "Use under dependency",
        FinancialInvestments => "Financial investments",

        // CUT operations
        Premises => "Premises",
        StaffCommute => "Staff commute",
        TeamMeals => "Team meals",

        // CUT audience
        AudienceTravel => "Audience travel",

        // CUT tours and previews
        Tours => "Tours",
        Previews => "Previews",

        // CUT screens and booths
        ProjectionEquipment => "Projection equipment",
        ScreeningRooms => "Screening rooms",

        // CUT concessions
        Concessions => "Concessions",

        // CUT waste
        OrdinaryWaste => "Ordinary waste",
        ExceptionalWaste => "Exceptional waste",

        // CUT ticketing and communication
        Ticketing => "Ticketing",
        Newsletters => "Newsletters",
        Posters => "Posters",
    }
}
