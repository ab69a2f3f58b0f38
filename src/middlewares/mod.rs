pub mod jwt_authentication;
