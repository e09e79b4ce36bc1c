/// Arrhenius rate laws and kinetic parameter sets for CaO-catalyzed
/// transesterification, including literature parameters (Salinas 2010,
/// Kouzu 2008, Liu 2008, Stamenkovic 2008) and the parameters calibrated
/// in this crate.
///
///  # Examples
/// ```
/// use BioTransKin::Kinetics::arrhenius::ArrheniusRateLaw;
/// let law = ArrheniusRateLaw::new(8.0e5, 50.0).unwrap();
/// let k60 = law.k_at(60.0).unwrap();
/// let k75 = law.k_at(75.0).unwrap();
/// assert!(k75 > k60);
/// ```
pub mod arrhenius;
/// Reaction network topologies (lumped 1-step and sequential 3-step
/// TG -> DG -> MG -> GL), concentration states, rate evaluation and the
/// symbolic right-hand sides handed to the ODE solver.
///
///  # Examples
/// ```
/// use BioTransKin::Kinetics::reaction_network::{ConcentrationState, ReactionTopology};
/// let feed = ConcentrationState::fresh_feed(ReactionTopology::OneStep, 0.5, 6.0).unwrap();
/// assert_eq!(feed.get("MeOH"), Some(3.0));
/// ```
pub mod reaction_network;
/// Liquid-phase properties of the reaction mixture components: molecular
/// weights, temperature-dependent densities and Andrade viscosities.
pub mod properties;
/// Initial value problem for an isothermal transesterification batch:
/// stiff integration of the reaction network, conversion/yield
/// trajectories, equilibrium composition and one-at-a-time parameter
/// sensitivities.
#[allow(non_snake_case)]
pub mod transesterification_IVP;
