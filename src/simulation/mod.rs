pub mod perturbation;
