mod invert_matching;
