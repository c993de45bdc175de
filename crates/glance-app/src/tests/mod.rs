mod command_parse_tests;
