pub mod trainer_test;
