pub mod mock_rabbitmq;
