pub mod insurance;
pub mod specialty;

pub use insurance::InsurancePlanService;
pub use specialty::SpecialtyService;
