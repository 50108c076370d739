mod geotiff_tests;
