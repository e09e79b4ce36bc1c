pub fn bio_examples(biotask: usize) {
    //

    match biotask {
        0 => {
            // BATCH SIMULATION
            // isothermal batch at 60 C, 6:1 MeOH:TG, calibrated parameters
            use crate::Kinetics::arrhenius::KineticParameters;
            use crate::Kinetics::reaction_network::{ConcentrationState, ReactionTopology};
            use crate::Kinetics::transesterification_IVP::TransesterificationIVP;
            let params = KineticParameters::calibrated_reference();
            let feed =
                ConcentrationState::fresh_feed(ReactionTopology::OneStep, 0.5, 6.0).unwrap();
            let mut ivp = TransesterificationIVP::default_solver();
            ivp.set_problem(params, 60.0, feed, 120.0, 13).unwrap();
            ivp.solve().unwrap();

            let traj = ivp.trajectory().unwrap();
            for (i, t) in traj.times.iter().enumerate() {
                println!(
                    "t = {:6.1} min   conversion = {:6.2} %   FAME yield = {:6.2} %",
                    t, traj.conversion[i], traj.fame_yield[i]
                );
            }
            let eq = ivp.equilibrium().unwrap();
            println!("equilibrium conversion: {:.2} %", eq.conversion);
        }
        1 => {
            // 3-STEP NETWORK AND SENSITIVITY
            use crate::Kinetics::arrhenius::KineticParameters;
            use crate::Kinetics::reaction_network::{ConcentrationState, ReactionTopology};
            use crate::Kinetics::transesterification_IVP::{
                KineticField, Perturbation, TransesterificationIVP,
            };
            let params = KineticParameters::liu_2008();
            let feed =
                ConcentrationState::fresh_feed(ReactionTopology::ThreeStep, 0.5, 6.0).unwrap();
            let mut ivp = TransesterificationIVP::default_solver();
            ivp.set_problem(params, 60.0, feed, 120.0, 13).unwrap();
            ivp.solve().unwrap();
            let traj = ivp.trajectory().unwrap();
            println!("final conversion: {:.2} %", traj.final_conversion());
            println!("final FAME yield: {:.2} %", traj.final_fame_yield());

            // how the trajectory responds to +10 % on Ea of the first step
            let sens = ivp
                .parameter_sensitivity(
                    Perturbation {
                        step: 0,
                        reverse: false,
                        field: KineticField::ActivationEnergy,
                    },
                    0.1,
                )
                .unwrap();
            println!("sensitivities at t = {:.0} min:", sens.times[6]);
            for (j, name) in sens.species.iter().enumerate() {
                println!("  {:5}: {:8.3}", name, sens.s[(6, j)]);
            }
        }
        2 => {
            // PARAMETER CALIBRATION
            use crate::Calibration::calibrator::ParameterCalibrator;
            use crate::Calibration::experiment_data::ExperimentSet;
            let mut cal = ParameterCalibrator::new();
            cal.set_experiments(ExperimentSet::kouzu_reference());
            let outcome = cal.calibrate().unwrap();
            outcome.print_report();
        }
        3 => {
            // PROCESS OPTIMIZATION, pure conversion
            use crate::Kinetics::arrhenius::KineticParameters;
            use crate::Optimization::process_optimizer::ProcessOptimizer;
            let mut opt = ProcessOptimizer::new(KineticParameters::calibrated_reference());
            opt.set_reaction_time(90.0).unwrap();
            let cond = opt.optimize().unwrap();
            cond.print_report();
        }
        4 => {
            // BIFURCATION SWEEP over batch time
            use crate::Kinetics::arrhenius::KineticParameters;
            use crate::Optimization::process_optimizer::ProcessOptimizer;
            let mut opt = ProcessOptimizer::new(KineticParameters::calibrated_reference());
            opt.set_search_budget(20, 30);
            let sweep = opt
                .bifurcation_sweep(&[60.0, 70.0, 80.0, 90.0, 100.0, 110.0, 120.0])
                .unwrap();
            for p in &sweep.points {
                println!(
                    "t = {:5.0} min  wE = {:6.4}  T = {:5.2} C  rpm = {:5.0}  cat = {:4.2} %  ratio = {:4.2}",
                    p.t_reaction,
                    p.weights.energy,
                    p.condition.temperature,
                    p.condition.agitation,
                    p.condition.catalyst_pct,
                    p.condition.molar_ratio
                );
            }
            match sweep.jump {
                Some(jump) => println!(
                    "agitation jump of {:.0} rpm between t = {} and t = {} min",
                    jump.delta_agitation, jump.t_before, jump.t_after
                ),
                None => println!("no agitation jump detected"),
            }
        }
        5 => {
            // RESPONSE SURFACE + MIXTURE PROPERTIES
            use crate::Kinetics::arrhenius::KineticParameters;
            use crate::Kinetics::properties::Component;
            use crate::Optimization::process_optimizer::{
                OperatingVariable, ProcessOptimizer,
            };
            let opt = ProcessOptimizer::new(KineticParameters::calibrated_reference());
            let surface = opt
                .response_surface(
                    OperatingVariable::Temperature,
                    OperatingVariable::MolarRatio,
                    4,
                    4,
                )
                .unwrap();
            println!("conversion over (T, MeOH:TG):");
            println!("{}", surface.conversion);

            for comp in [Component::AverageTG, Component::AverageFAME, Component::Methanol] {
                println!(
                    "{:?}: M = {:.1} g/mol, rho(60 C) = {:.1} kg/m3",
                    comp,
                    comp.molecular_weight(),
                    comp.density(60.0)
                );
            }
        }
        _ => {
            println!("there is no such task");
        }
    }
}
