pub mod dev_seeder;
