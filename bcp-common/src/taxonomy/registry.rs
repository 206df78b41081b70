//! Per-environment SubPost → Post mappings
//!
//! Each environment is a `Taxonomy` entry in a static table: an ordered list
//! of exposed posts plus a pure mapping function. Aggregation selects the
//! entry once and never branches on the environment afterwards.

use super::{Environment, Post, SubPost};
use crate::error::{Error, Result};

/// Category taxonomy of one environment
#[derive(Debug)]
pub struct Taxonomy {
    environment: Environment,
    posts: &'static [Post],
    post_of: fn(SubPost) -> Option<Post>,
}

impl Taxonomy {
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Posts exposed by this environment, in display order
    pub fn posts(&self) -> &'static [Post] {
        self.posts
    }

    /// Owning post of `sub_post`
    ///
    /// # Errors
    /// `Error::UnknownSubPost` when this environment does not map the SubPost.
    /// That is a drift between the SubPost enum and the taxonomy tables, not
    /// a condition callers should recover from.
    pub fn post(&self, sub_post: SubPost) -> Result<Post> {
        (self.post_of)(sub_post).ok_or(Error::UnknownSubPost {
            sub_post,
            environment: self.environment,
        })
    }

    /// Whether `sub_post` belongs to this environment
    pub fn contains(&self, sub_post: SubPost) -> bool {
        (self.post_of)(sub_post).is_some()
    }

    /// SubPosts grouped under `post`, in declaration order
    pub fn sub_posts(&self, post: Post) -> Vec<SubPost> {
        SubPost::all_variants()
            .iter()
            .copied()
            .filter(|sp| (self.post_of)(*sp) == Some(post))
            .collect()
    }
}

static TAXONOMIES: [Taxonomy; 3] = [
    Taxonomy {
        environment: Environment::BilanCarbone,
        posts: &[
            Post::Energy,
            Post::NonEnergyEmissions,
            Post::InputGoods,
            Post::InputServices,
            Post::DirectWaste,
            Post::EndOfLife,
            Post::Freight,
            Post::Travel,
            Post::FixedAssets,
            Post::UseAndDependency,
        ],
        post_of: bilan_carbone_post,
    },
    Taxonomy {
        environment: Environment::Cut,
        posts: &[
            Post::Operations,
            Post::AudienceMobility,
            Post::ToursAndPreviews,
            Post::ScreensAndBooths,
            Post::ConcessionsAndDrinks,
            Post::Waste,
            Post::TicketingAndCommunication,
        ],
        post_of: cut_post,
    },
    Taxonomy {
        environment: Environment::Tilt,
        posts: &[
            Post::Energy,
            Post::Travel,
            Post::Food,
            Post::InputGoods,
            Post::InputServices,
            Post::DirectWaste,
            Post::Freight,
            Post::FixedAssets,
            Post::UseAndDependency,
            Post::EndOfLife,
            Post::NonEnergyEmissions,
        ],
        post_of: tilt_post,
    },
];

/// Taxonomy of `environment`
pub fn taxonomy(environment: Environment) -> &'static Taxonomy {
    match environment {
        Environment::BilanCarbone => &TAXONOMIES[0],
        Environment::Cut => &TAXONOMIES[1],
        Environment::Tilt => &TAXONOMIES[2],
    }
}

/// Owning post of `sub_post` in `environment`
pub fn get_post(sub_post: SubPost, environment: Environment) -> Result<Post> {
    taxonomy(environment).post(sub_post)
}

/// Posts exposed by `environment`, in display order
pub fn list_posts(environment: Environment) -> &'static [Post] {
    taxonomy(environment).posts()
}

fn bilan_carbone_post(sub_post: SubPost) -> Option<Post> {
    use SubPost::*;
    let post = match sub_post {
        FossilFuels | OrganicFuels | HeatAndSteamNetworks | CoolingNetworks | Electricity => Post::Energy,
        Agriculture | LandUseChange | RefrigerantLeaks | IndustrialProcesses | OtherNonEnergyEmissions => {
            Post::NonEnergyEmissions
        }
        MetalsPlasticsAndGlass | PaperAndCardboard | ConstructionMaterials | ChemicalsAndHydrogen
        | FoodMealsAndDrinks | RawMaterials | OtherInputs => Post::InputGoods,
        PurchasedServices | DigitalUsage => Post::InputServices,
        PackagingWaste | OrganicWaste | HouseholdWaste | HazardousWaste | BuildingWaste | WasteWater
        | OtherWaste => Post::DirectWaste,
        EndOfLifePackaging | EndOfLifeProducts => Post::EndOfLife,
        InboundFreight | InternalFreight | OutboundFreight => Post::Freight,
        CommuteTravel | BusinessTravel | VisitorTravel => Post::Travel,
        Buildings | OtherInfrastructure | Equipment | ItEquipment => Post::FixedAssets,
        UseUnderResponsibility | UseUnderDependency | FinancialInvestments => Post::UseAndDependency,
        _ => return None,
    };
    Some(post)
}

fn cut_post(sub_post: SubPost) -> Option<Post> {
    use SubPost::*;
    let post = match sub_post {
        Premises | StaffCommute | TeamMeals => Post::Operations,
        AudienceTravel => Post::AudienceMobility,
        Tours | Previews => Post::ToursAndPreviews,
        ProjectionEquipment | ScreeningRooms => Post::ScreensAndBooths,
        Concessions => Post::ConcessionsAndDrinks,
        OrdinaryWaste | ExceptionalWaste => Post::Waste,
        Ticketing | Newsletters | Posters => Post::TicketingAndCommunication,
        _ => return None,
    };
    Some(post)
}

// Same universe as Bilan Carbone, with meals pulled out into their own post
fn tilt_post(sub_post: SubPost) -> Option<Post> {
    match sub_post {
        SubPost::FoodMealsAndDrinks => Some(Post::Food),
        other => bilan_carbone_post(other),
    }
}
